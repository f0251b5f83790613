#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use folio_viewer::{
    Canvas, ControlState, ControlSurface, DocumentHandle, DocumentLoader, Layout,
    NavigationStore, Navigator, Page, RenderScheduler, Surface, Viewport,
};

/// Document whose pages can be held mid-draw.
#[derive(Default)]
pub struct SlowDocument {
    pub pages: u32,
    pub hold: Mutex<Option<(u32, Arc<Hold>)>>,
    pub drawn: Arc<Mutex<Vec<u32>>>,
}

#[derive(Default)]
pub struct Hold {
    pub started: Notify,
    pub release: Notify,
}

impl SlowDocument {
    pub fn new(pages: u32) -> Arc<Self> {
        Arc::new(Self {
            pages,
            ..Self::default()
        })
    }

    pub fn hold(&self, page: u32) -> Arc<Hold> {
        let hold = Arc::new(Hold::default());
        *self.hold.lock().unwrap() = Some((page, hold.clone()));
        hold
    }

    pub fn drawn(&self) -> Vec<u32> {
        self.drawn.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentHandle for SlowDocument {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn get_page(&self, page: u32) -> Result<Arc<dyn Page>> {
        if page == 0 || page > self.pages {
            return Err(anyhow!("no page {page}"));
        }
        let hold = {
            let mut slot = self.hold.lock().unwrap();
            match slot.take() {
                Some((held, hold)) if held == page => Some(hold),
                other => {
                    *slot = other;
                    None
                }
            }
        };
        Ok(Arc::new(SlowPage {
            page,
            hold,
            drawn: self.drawn.clone(),
        }))
    }
}

struct SlowPage {
    page: u32,
    hold: Option<Arc<Hold>>,
    drawn: Arc<Mutex<Vec<u32>>>,
}

#[async_trait]
impl Page for SlowPage {
    fn viewport(&self, scale: f32) -> Viewport {
        // Page size grows with the page number so each draw leaves a
        // distinct surface size behind.
        Viewport::new(400.0 + self.page as f32, 500.0).scaled(scale)
    }

    async fn render(&self, surface: &mut dyn Surface, _viewport: Viewport) -> Result<()> {
        if let Some(hold) = &self.hold {
            hold.started.notify_one();
            hold.release.notified().await;
        }
        if let Some(first) = surface.pixels_mut().first_mut() {
            *first = self.page as u8;
        }
        self.drawn.lock().unwrap().push(self.page);
        Ok(())
    }
}

#[derive(Default)]
pub struct Chrome {
    pub indicator: Mutex<Option<u32>>,
    pub controls: Mutex<Option<ControlState>>,
}

impl ControlSurface for Chrome {
    fn show_load_error(&self, _message: &str) {}

    fn set_page_count(&self, _total: u32) {}

    fn set_page_indicator(&self, page: u32) {
        *self.indicator.lock().unwrap() = Some(page);
    }

    fn set_controls(&self, controls: ControlState) {
        *self.controls.lock().unwrap() = Some(controls);
    }
}

pub fn navigator(
    document: &Arc<SlowDocument>,
    start: u32,
    store: NavigationStore,
    chrome: Arc<Chrome>,
) -> Navigator<Canvas> {
    let handle: Arc<dyn DocumentHandle> = document.clone();
    Navigator::new(start, document.pages, store, chrome, move |listener| {
        RenderScheduler::new(handle, Canvas::new(), Layout::new(1000.0, 800.0, 1920))
            .with_listener(listener)
    })
}

pub struct StaticLoader(pub Arc<SlowDocument>);

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(
        &self,
        _locator: &str,
        on_progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<Arc<dyn DocumentHandle>> {
        on_progress(1, 1);
        Ok(self.0.clone())
    }
}
