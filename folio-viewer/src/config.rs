use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Viewer settings. Every field has a default so a partial JSON file is
/// enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Resource handed to the document loader.
    pub document: String,
    /// Screens at or below this width get the scrolling page list.
    pub mobile_breakpoint_px: u32,
    /// Upper bound for one page fetch + draw. `None` waits forever.
    pub render_timeout_ms: Option<u64>,
    /// Where the JSON state store lives. `None` keeps state in memory.
    pub state_path: Option<PathBuf>,
}

impl ViewerConfig {
    pub const DEFAULT_DOCUMENT: &'static str = "./portfolio.pdf";
    pub const DEFAULT_MOBILE_BREAKPOINT_PX: u32 = 768;
    pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 30_000;

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn render_timeout(&self) -> Option<Duration> {
        self.render_timeout_ms.map(Duration::from_millis)
    }

    pub fn is_mobile(&self, screen_width: u32) -> bool {
        screen_width <= self.mobile_breakpoint_px
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            document: Self::DEFAULT_DOCUMENT.to_string(),
            mobile_breakpoint_px: Self::DEFAULT_MOBILE_BREAKPOINT_PX,
            render_timeout_ms: Some(Self::DEFAULT_RENDER_TIMEOUT_MS),
            state_path: None,
        }
    }
}
