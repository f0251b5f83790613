//! Page navigation for the desktop single-page layout.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::document::Surface;
use crate::error::{NavigationError, RenderError};
use crate::input::Command;
use crate::scheduler::{RenderListener, RenderOutcome, RenderScheduler};
use crate::store::NavigationStore;
use crate::zoom::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Enabled/visible state of the navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub home_visible: bool,
}

impl ControlState {
    pub fn for_page(current: u32, total: u32) -> Self {
        Self {
            prev_enabled: current > 1,
            next_enabled: current < total,
            home_visible: current > 1,
        }
    }
}

/// The page chrome the viewer drives. Visual effects default to no-ops.
pub trait ControlSurface: Send + Sync {
    fn show_progress(&self, _loaded: u64, _total: u64) {}

    /// Replaces the loading indicator.
    fn show_load_error(&self, message: &str);

    fn set_page_count(&self, total: u32);

    fn set_page_indicator(&self, page: u32);

    fn set_controls(&self, controls: ControlState);

    fn page_transition(&self, _direction: Direction) {}

    /// Fired once per persisted lifetime, the first time home appears.
    fn show_home_hint(&self) {}

    /// Narrow-screen notice, shown in the scrolling layout.
    fn show_notification(&self) {}

    fn download(&self) {}
}

/// Clamp a restored page against the loaded document. Anything past the end
/// goes back to page 1.
pub fn clamp_restored_page(restored: u32, total: u32) -> u32 {
    if restored == 0 || restored > total {
        1
    } else {
        restored
    }
}

/// Parse page-number entry text. Only whole numbers are accepted.
pub fn parse_page_entry(input: &str) -> Result<i64, NavigationError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| NavigationError::NotANumber {
            input: input.to_string(),
        })
}

struct NavigationState {
    current: AtomicU32,
    total: u32,
    home_visible: AtomicBool,
    store: NavigationStore,
    controls: Arc<dyn ControlSurface>,
}

impl NavigationState {
    fn current(&self) -> u32 {
        self.current.load(Ordering::SeqCst)
    }

    fn refresh_controls(&self) {
        let state = ControlState::for_page(self.current(), self.total);
        self.controls.set_controls(state);

        let was_visible = self.home_visible.swap(state.home_visible, Ordering::SeqCst);
        if state.home_visible && !was_visible && !self.store.seen_home_hint() {
            debug!("showing home hint");
            self.controls.show_home_hint();
            self.store.mark_home_hint_seen();
        }
    }
}

impl RenderListener for NavigationState {
    fn page_rendered(&self, page: u32, _scale: f32) {
        self.controls.set_page_indicator(page);
        self.store.save_current_page(page);
        self.refresh_controls();
    }

    fn render_failed(&self, _error: &RenderError) {
        self.refresh_controls();
    }
}

/// Current-page state machine over a loaded document. Cheap to clone; all
/// clones drive the same scheduler.
pub struct Navigator<S> {
    state: Arc<NavigationState>,
    scheduler: Arc<RenderScheduler<S>>,
}

impl<S> Clone for Navigator<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: Surface> Navigator<S> {
    /// `build` receives the listener that must be attached to the scheduler
    /// so completed renders update the indicator, store and controls.
    pub fn new<F>(
        start_page: u32,
        total: u32,
        store: NavigationStore,
        controls: Arc<dyn ControlSurface>,
        build: F,
    ) -> Self
    where
        F: FnOnce(Arc<dyn RenderListener>) -> RenderScheduler<S>,
    {
        let state = Arc::new(NavigationState {
            current: AtomicU32::new(clamp_restored_page(start_page, total)),
            total,
            home_visible: AtomicBool::new(false),
            store,
            controls,
        });
        let listener: Arc<dyn RenderListener> = state.clone();
        let scheduler = Arc::new(build(listener));
        Self { state, scheduler }
    }

    pub fn current_page(&self) -> u32 {
        self.state.current()
    }

    pub fn total_pages(&self) -> u32 {
        self.state.total
    }

    pub fn controls(&self) -> ControlState {
        ControlState::for_page(self.current_page(), self.state.total)
    }

    pub fn scheduler(&self) -> &Arc<RenderScheduler<S>> {
        &self.scheduler
    }

    pub fn refresh_controls(&self) {
        self.state.refresh_controls();
    }

    /// Render whatever page is current, e.g. after load.
    pub async fn render_current(&self) -> RenderOutcome {
        self.scheduler.request_render(self.current_page()).await
    }

    pub async fn go_prev(&self) -> Option<RenderOutcome> {
        let page = self.step(|current| (current > 1).then(|| current - 1))?;
        Some(self.show(page, Direction::Backward).await)
    }

    pub async fn go_next(&self) -> Option<RenderOutcome> {
        let total = self.state.total;
        let page = self.step(|current| (current < total).then(|| current + 1))?;
        Some(self.show(page, Direction::Forward).await)
    }

    pub async fn go_home(&self) -> Option<RenderOutcome> {
        let page = self.step(|current| (current > 1).then_some(1))?;
        Some(self.show(page, Direction::Backward).await)
    }

    /// Jump to `target`. Rejected without any state change when it is out of
    /// range or already current.
    pub async fn go_to_page(&self, target: i64) -> Result<RenderOutcome, NavigationError> {
        let total = self.state.total;
        let page = u32::try_from(target)
            .ok()
            .filter(|page| (1..=total).contains(page))
            .ok_or(NavigationError::OutOfRange {
                page: target,
                total,
            })?;

        let previous = self
            .state
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current != page).then_some(page)
            })
            .map_err(|current| NavigationError::AlreadyOnPage { page: current })?;

        let direction = if page < previous {
            Direction::Backward
        } else {
            Direction::Forward
        };
        Ok(self.show(page, direction).await)
    }

    /// Text from the page-number entry field.
    pub async fn go_to_entry(&self, input: &str) -> Result<RenderOutcome, NavigationError> {
        let target = parse_page_entry(input)?;
        self.go_to_page(target).await
    }

    pub async fn zoom_in(&self) -> RenderOutcome {
        let scale = self.scheduler.zoom_in();
        debug!(scale, "zoom in");
        self.render_current().await
    }

    /// `None` when the scale is already at its floor.
    pub async fn zoom_out(&self) -> Option<RenderOutcome> {
        if !self.scheduler.zoom_out() {
            debug!("zoom out refused at minimum scale");
            return None;
        }
        Some(self.render_current().await)
    }

    pub async fn reset_zoom(&self) -> RenderOutcome {
        self.scheduler.reset_zoom();
        self.render_current().await
    }

    /// New container/screen size. Re-renders unless zoom is manual.
    pub async fn resize(&self, layout: Layout) -> Option<RenderOutcome> {
        self.scheduler.set_layout(layout);
        if self.scheduler.zoom().is_manual() {
            return None;
        }
        Some(self.render_current().await)
    }

    pub fn download(&self) {
        info!("download requested");
        self.state.controls.download();
    }

    /// `None` for commands that turned out to be no-ops.
    pub async fn execute(&self, command: Command) -> Option<RenderOutcome> {
        match command {
            Command::Prev => self.go_prev().await,
            Command::Next => self.go_next().await,
            Command::Home => self.go_home().await,
            Command::ZoomIn => Some(self.zoom_in().await),
            Command::ZoomOut => self.zoom_out().await,
            Command::ZoomReset => Some(self.reset_zoom().await),
            Command::Download => {
                self.download();
                None
            }
        }
    }

    fn step(&self, next: impl Fn(u32) -> Option<u32>) -> Option<u32> {
        self.state
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, &next)
            .ok()
            .and_then(next)
    }

    async fn show(&self, page: u32, direction: Direction) -> RenderOutcome {
        debug!(page, ?direction, "navigating");
        self.state.controls.page_transition(direction);
        self.state.refresh_controls();
        self.scheduler.request_render(page).await
    }
}
