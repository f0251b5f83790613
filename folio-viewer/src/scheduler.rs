//! Render scheduling for the single desktop surface.
//!
//! At most one render runs at a time. A request that arrives while a render
//! is in flight goes into a one-entry pending slot, overwriting whatever was
//! waiting there: during rapid navigation intermediate pages are skipped and
//! only the newest request is drawn. The call that started rendering keeps
//! draining the slot until it is empty, then the scheduler goes idle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::document::{DocumentHandle, Surface};
use crate::error::RenderError;
use crate::zoom::{Layout, ZoomState};

/// Receives the outcome of every render the scheduler finishes.
pub trait RenderListener: Send + Sync {
    fn page_rendered(&self, page: u32, scale: f32);

    fn render_failed(&self, _error: &RenderError) {}
}

/// What happened to a `request_render` call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// This call drove the renders, including any continuations picked up
    /// from the pending slot.
    Completed(RenderReport),
    /// A render was already in flight; the page now waits in the pending
    /// slot. `replaced` is the request it overwrote.
    Coalesced { replaced: Option<u32> },
}

impl RenderOutcome {
    pub fn report(&self) -> Option<&RenderReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Coalesced { .. } => None,
        }
    }
}

/// Pages drawn (or failed) by one driving call, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub rendered: Vec<u32>,
    pub failed: Vec<u32>,
}

impl RenderReport {
    pub fn last_rendered(&self) -> Option<u32> {
        self.rendered.last().copied()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub completed: u64,
    pub failed: u64,
    pub coalesced: u64,
}

#[derive(Debug, Default)]
struct RequestSlot {
    in_flight: bool,
    pending: Option<u32>,
}

#[derive(Debug)]
struct ViewSettings {
    zoom: ZoomState,
    layout: Layout,
}

pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RenderScheduler<S> {
    document: Arc<dyn DocumentHandle>,
    surface: tokio::sync::Mutex<S>,
    slot: Mutex<RequestSlot>,
    view: Mutex<ViewSettings>,
    stats: Mutex<SchedulerStats>,
    listener: Option<Arc<dyn RenderListener>>,
    timeout: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: Surface> RenderScheduler<S> {
    pub fn new(document: Arc<dyn DocumentHandle>, surface: S, layout: Layout) -> Self {
        Self {
            document,
            surface: tokio::sync::Mutex::new(surface),
            slot: Mutex::new(RequestSlot::default()),
            view: Mutex::new(ViewSettings {
                zoom: ZoomState::new(),
                layout,
            }),
            stats: Mutex::new(SchedulerStats::default()),
            listener: None,
            timeout: Some(DEFAULT_RENDER_TIMEOUT),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn RenderListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// `None` lets a stalled fetch or draw hold the scheduler indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_zoom(self, zoom: ZoomState) -> Self {
        lock(&self.view).zoom = zoom;
        self
    }

    pub fn document(&self) -> &Arc<dyn DocumentHandle> {
        &self.document
    }

    /// Draw `page` now, or park it in the pending slot if a render is
    /// running.
    pub async fn request_render(&self, page: u32) -> RenderOutcome {
        {
            let mut slot = lock(&self.slot);
            if slot.in_flight {
                let replaced = slot.pending.replace(page);
                lock(&self.stats).coalesced += 1;
                debug!(page, ?replaced, "render in flight, request coalesced");
                return RenderOutcome::Coalesced { replaced };
            }
            slot.in_flight = true;
        }

        let mut guard = InFlight {
            slot: &self.slot,
            armed: true,
        };
        let mut report = RenderReport::default();
        let mut next = page;

        loop {
            match self.draw_bounded(next).await {
                Ok(scale) => {
                    debug!(page = next, scale, "page rendered");
                    lock(&self.stats).completed += 1;
                    report.rendered.push(next);
                    if let Some(listener) = &self.listener {
                        listener.page_rendered(next, scale);
                    }
                }
                Err(err) => {
                    error!(page = next, error = %err, "error rendering page");
                    lock(&self.stats).failed += 1;
                    report.failed.push(next);
                    if let Some(listener) = &self.listener {
                        listener.render_failed(&err);
                    }
                }
            }

            let mut slot = lock(&self.slot);
            match slot.pending.take() {
                Some(pending) => next = pending,
                None => {
                    slot.in_flight = false;
                    guard.armed = false;
                    break;
                }
            }
        }

        RenderOutcome::Completed(report)
    }

    async fn draw_bounded(&self, page: u32) -> Result<f32, RenderError> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.draw(page))
                .await
                .map_err(|_| RenderError::TimedOut { page, timeout })?,
            None => self.draw(page).await,
        }
    }

    async fn draw(&self, page_number: u32) -> Result<f32, RenderError> {
        let page = self
            .document
            .get_page(page_number)
            .await
            .map_err(|source| RenderError::Fetch {
                page: page_number,
                source,
            })?;

        let scale = {
            let mut view = lock(&self.view);
            let layout = view.layout;
            view.zoom.resolve(page.viewport(1.0), &layout)
        };
        let viewport = page.viewport(scale);
        let (width, height) = viewport.pixel_size();

        let mut surface = self.surface.lock().await;
        surface.resize(width, height);
        page.render(&mut *surface, viewport)
            .await
            .map_err(|source| RenderError::Draw {
                page: page_number,
                source,
            })?;

        Ok(scale)
    }

    pub fn is_rendering(&self) -> bool {
        lock(&self.slot).in_flight
    }

    pub fn pending(&self) -> Option<u32> {
        lock(&self.slot).pending
    }

    pub fn stats(&self) -> SchedulerStats {
        *lock(&self.stats)
    }

    pub fn zoom(&self) -> ZoomState {
        lock(&self.view).zoom
    }

    pub fn zoom_in(&self) -> f32 {
        let mut view = lock(&self.view);
        view.zoom.zoom_in();
        view.zoom.scale()
    }

    /// Returns `false` when the step would go below the manual floor.
    pub fn zoom_out(&self) -> bool {
        lock(&self.view).zoom.zoom_out()
    }

    pub fn reset_zoom(&self) {
        lock(&self.view).zoom.reset();
    }

    pub fn layout(&self) -> Layout {
        lock(&self.view).layout
    }

    pub fn set_layout(&self, layout: Layout) {
        lock(&self.view).layout = layout;
    }

    /// Exclusive access to the surface. Waits for an in-progress draw.
    pub async fn surface(&self) -> tokio::sync::MutexGuard<'_, S> {
        self.surface.lock().await
    }
}

/// Releases the in-flight flag if the driving future is dropped mid-render,
/// so one abandoned caller can't wedge the scheduler. A request parked
/// behind the abandoned render is discarded with it; otherwise it would be
/// drawn after whatever the next caller asks for.
struct InFlight<'a> {
    slot: &'a Mutex<RequestSlot>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut slot = lock(self.slot);
            let discarded = slot.pending.take();
            slot.in_flight = false;
            warn!(?discarded, "render driver dropped before finishing");
        }
    }
}
