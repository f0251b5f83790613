//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::document::{Canvas, DocumentHandle, DocumentLoader, Page, Surface, Viewport};
use crate::error::RenderError;
use crate::navigation::{ControlState, ControlSurface, Direction};
use crate::scheduler::RenderListener;

/// Holds a page's draw until released.
#[derive(Default)]
pub struct Gate {
    pub started: Notify,
    pub release: Notify,
}

#[derive(Default)]
struct Shared {
    fail_draw: Mutex<HashSet<u32>>,
    fail_fetch: Mutex<HashSet<u32>>,
    gates: Mutex<HashMap<u32, Arc<Gate>>>,
    drawn: Mutex<Vec<u32>>,
}

pub struct FakeDocument {
    pages: u32,
    size: Viewport,
    shared: Arc<Shared>,
}

impl FakeDocument {
    pub fn new(pages: u32) -> Arc<Self> {
        Self::with_size(pages, Viewport::new(800.0, 600.0))
    }

    pub fn with_size(pages: u32, size: Viewport) -> Arc<Self> {
        Arc::new(Self {
            pages,
            size,
            shared: Arc::default(),
        })
    }

    /// The next draw of `page` blocks until `release` is notified.
    pub fn gate(&self, page: u32) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.shared.gates.lock().unwrap().insert(page, gate.clone());
        gate
    }

    pub fn fail_page(&self, page: u32) {
        self.shared.fail_draw.lock().unwrap().insert(page);
    }

    pub fn fail_fetch(&self, page: u32) {
        self.shared.fail_fetch.lock().unwrap().insert(page);
    }

    pub fn drawn(&self) -> Vec<u32> {
        self.shared.drawn.lock().unwrap().clone()
    }

    /// Page number stamped into the first pixel by the last draw.
    pub fn marker(canvas: &Canvas) -> Option<u32> {
        canvas.pixels().first().map(|byte| u32::from(*byte))
    }
}

#[async_trait]
impl DocumentHandle for FakeDocument {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn get_page(&self, page: u32) -> Result<Arc<dyn Page>> {
        if page == 0 || page > self.pages {
            return Err(anyhow!("page {page} out of range"));
        }
        if self.shared.fail_fetch.lock().unwrap().contains(&page) {
            return Err(anyhow!("fetch failed for page {page}"));
        }
        Ok(Arc::new(FakePage {
            number: page,
            size: self.size,
            shared: self.shared.clone(),
        }))
    }
}

struct FakePage {
    number: u32,
    size: Viewport,
    shared: Arc<Shared>,
}

#[async_trait]
impl Page for FakePage {
    fn viewport(&self, scale: f32) -> Viewport {
        self.size.scaled(scale)
    }

    async fn render(&self, surface: &mut dyn Surface, _viewport: Viewport) -> Result<()> {
        let gate = self.shared.gates.lock().unwrap().remove(&self.number);
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        if self.shared.fail_draw.lock().unwrap().contains(&self.number) {
            return Err(anyhow!("draw failed for page {}", self.number));
        }
        if let Some(first) = surface.pixels_mut().first_mut() {
            *first = self.number as u8;
        }
        self.shared.drawn.lock().unwrap().push(self.number);
        Ok(())
    }
}

pub struct FakeLoader {
    pub document: Option<Arc<FakeDocument>>,
}

#[async_trait]
impl DocumentLoader for FakeLoader {
    async fn load(
        &self,
        locator: &str,
        on_progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<Arc<dyn DocumentHandle>> {
        on_progress(50, 100);
        on_progress(100, 100);
        match &self.document {
            Some(document) => Ok(document.clone()),
            None => Err(anyhow!("404 fetching {locator}")),
        }
    }
}

#[derive(Default)]
pub struct RecordingListener {
    rendered: Mutex<Vec<(u32, f32)>>,
    failed: Mutex<Vec<u32>>,
}

impl RecordingListener {
    pub fn rendered_pages(&self) -> Vec<u32> {
        self.rendered.lock().unwrap().iter().map(|(page, _)| *page).collect()
    }

    pub fn failed(&self) -> Vec<u32> {
        self.failed.lock().unwrap().clone()
    }
}

impl RenderListener for RecordingListener {
    fn page_rendered(&self, page: u32, scale: f32) {
        self.rendered.lock().unwrap().push((page, scale));
    }

    fn render_failed(&self, error: &RenderError) {
        self.failed.lock().unwrap().push(error.page());
    }
}

#[derive(Default)]
pub struct RecordingControls {
    pub progress: Mutex<Vec<(u64, u64)>>,
    pub errors: Mutex<Vec<String>>,
    pub page_count: Mutex<Option<u32>>,
    pub indicator: Mutex<Option<u32>>,
    pub controls: Mutex<Option<ControlState>>,
    pub transitions: Mutex<Vec<Direction>>,
    pub home_hints: Mutex<u32>,
    pub notifications: Mutex<u32>,
    pub downloads: Mutex<u32>,
}

impl RecordingControls {
    pub fn controls(&self) -> ControlState {
        self.controls.lock().unwrap().expect("controls never refreshed")
    }

    pub fn indicator(&self) -> Option<u32> {
        *self.indicator.lock().unwrap()
    }

    pub fn home_hints(&self) -> u32 {
        *self.home_hints.lock().unwrap()
    }
}

impl ControlSurface for RecordingControls {
    fn show_progress(&self, loaded: u64, total: u64) {
        self.progress.lock().unwrap().push((loaded, total));
    }

    fn show_load_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn set_page_count(&self, total: u32) {
        *self.page_count.lock().unwrap() = Some(total);
    }

    fn set_page_indicator(&self, page: u32) {
        *self.indicator.lock().unwrap() = Some(page);
    }

    fn set_controls(&self, controls: ControlState) {
        *self.controls.lock().unwrap() = Some(controls);
    }

    fn page_transition(&self, direction: Direction) {
        self.transitions.lock().unwrap().push(direction);
    }

    fn show_home_hint(&self) {
        *self.home_hints.lock().unwrap() += 1;
    }

    fn show_notification(&self) {
        *self.notifications.lock().unwrap() += 1;
    }

    fn download(&self) {
        *self.downloads.lock().unwrap() += 1;
    }
}
