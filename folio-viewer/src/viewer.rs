//! Loading the document and choosing between the paged and scrolling
//! layouts.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::ViewerConfig;
use crate::document::{DocumentHandle, DocumentLoader, Surface};
use crate::error::LoadError;
use crate::navigation::{clamp_restored_page, ControlSurface, Navigator};
use crate::scheduler::RenderScheduler;
use crate::scroll::{render_all_pages, ScrollContainer, ScrollLayout, ScrollReport};
use crate::store::NavigationStore;
use crate::zoom::Layout;

/// Fixed once at load; a later resize never switches layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Paged,
    Scroll,
}

/// A successfully loaded document, ready to be shown in either layout.
pub struct LoadedDocument {
    document: Arc<dyn DocumentHandle>,
    store: NavigationStore,
    controls: Arc<dyn ControlSurface>,
    page_count: u32,
    start_page: u32,
    mode: LayoutMode,
    config: ViewerConfig,
}

/// Fetch `config.document` and prepare navigation state.
///
/// The restored page is clamped against the real page count; a stale value
/// past the end is reset to 1 and written back. On failure the controls
/// show the error and nothing is retried.
pub async fn load_document(
    loader: &dyn DocumentLoader,
    store: NavigationStore,
    controls: Arc<dyn ControlSurface>,
    screen_width: u32,
    config: ViewerConfig,
) -> Result<LoadedDocument, LoadError> {
    let restored = store.initial_page();
    let progress_controls = controls.clone();
    let on_progress = move |loaded: u64, total: u64| {
        if loaded > 0 && total > 0 {
            progress_controls.show_progress(loaded, total);
        }
    };

    let document = match loader.load(&config.document, &on_progress).await {
        Ok(document) => document,
        Err(source) => {
            let err = LoadError::new(source);
            error!(document = %config.document, error = %err, "error loading PDF");
            controls.show_load_error(&err.to_string());
            return Err(err);
        }
    };

    let total = document.page_count().max(1);
    controls.set_page_count(total);

    let start_page = clamp_restored_page(restored, total);
    if start_page != restored {
        warn!(restored, total, "restored page out of range, starting over");
        store.save_current_page(start_page);
    }

    let mode = if config.is_mobile(screen_width) {
        LayoutMode::Scroll
    } else {
        LayoutMode::Paged
    };
    info!(total, start_page, ?mode, "document loaded");

    Ok(LoadedDocument {
        document,
        store,
        controls,
        page_count: total,
        start_page,
        mode,
        config,
    })
}

impl LoadedDocument {
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Never zero, even when the loader reports an empty document.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    pub fn document(&self) -> &Arc<dyn DocumentHandle> {
        &self.document
    }

    /// Desktop layout: build the navigator around `surface` and draw the
    /// start page.
    pub async fn start_paged<S: Surface>(self, surface: S, layout: Layout) -> Navigator<S> {
        let total = self.page_count();
        let timeout = self.config.render_timeout();
        let document = self.document;
        let navigator = Navigator::new(
            self.start_page,
            total,
            self.store,
            self.controls,
            |listener| {
                RenderScheduler::new(document, surface, layout)
                    .with_listener(listener)
                    .with_timeout(timeout)
            },
        );
        navigator.refresh_controls();
        navigator.render_current().await;
        navigator
    }

    /// Narrow-screen layout: draw every page once, then offer the
    /// notification unless it was dismissed before.
    pub async fn render_scroll(
        self,
        container: &mut dyn ScrollContainer,
        layout: ScrollLayout,
    ) -> ScrollReport {
        let report = render_all_pages(self.document.as_ref(), &layout, container).await;
        if !self.store.notification_dismissed() {
            self.controls.show_notification();
        }
        report
    }
}
