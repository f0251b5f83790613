use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to open the document. Shown to the visitor in place of the
/// loading indicator; never retried.
#[derive(Debug, Error)]
#[error("Error loading PDF: {source}")]
pub struct LoadError {
    #[source]
    pub source: anyhow::Error,
}

impl LoadError {
    pub fn new(source: anyhow::Error) -> Self {
        Self { source }
    }
}

/// A single page failed to reach the surface.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to fetch page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to draw page {page}: {source}")]
    Draw {
        page: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("rendering page {page} did not finish within {timeout:?}")]
    TimedOut { page: u32, timeout: Duration },
}

impl RenderError {
    pub fn page(&self) -> u32 {
        match self {
            Self::Fetch { page, .. } | Self::Draw { page, .. } | Self::TimedOut { page, .. } => {
                *page
            }
        }
    }
}

/// Rejected page-number input. The caller reverts its display; nothing else
/// is surfaced to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("{input:?} is not a page number")]
    NotANumber { input: String },

    #[error("page {page} is outside 1..={total}")]
    OutOfRange { page: i64, total: u32 },

    #[error("already on page {page}")]
    AlreadyOnPage { page: u32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
