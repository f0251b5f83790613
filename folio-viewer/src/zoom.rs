//! Responsive zoom: fit-to-container scale with screen-size floors, and the
//! manual zoom override driven by the zoom buttons.

use crate::document::Viewport;

/// Container and screen dimensions the page has to fit into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub container_width: f32,
    pub container_height: f32,
    pub screen_width: u32,
}

impl Layout {
    pub fn new(container_width: f32, container_height: f32, screen_width: u32) -> Self {
        Self {
            container_width,
            container_height,
            screen_width,
        }
    }
}

pub const MAX_SCALE: f32 = 4.0;
pub const MIN_MANUAL_SCALE: f32 = 0.4;
pub const ZOOM_STEP: f32 = 0.2;
const FIT_MARGIN: f32 = 0.95;
const FLOOR_TOLERANCE: f32 = 1e-4;

/// (max screen width, minimum auto scale). Small factors look worse on large
/// panels, so wider screens get a higher floor.
const SCALE_FLOORS: [(u32, f32); 5] = [
    (1366, 0.4),
    (1440, 0.5),
    (1680, 0.6),
    (1920, 0.7),
    (2560, 0.8),
];
const WIDEST_SCALE_FLOOR: f32 = 0.9;

pub fn min_scale_for_screen(screen_width: u32) -> f32 {
    SCALE_FLOORS
        .iter()
        .find(|(max_width, _)| screen_width <= *max_width)
        .map(|(_, floor)| *floor)
        .unwrap_or(WIDEST_SCALE_FLOOR)
}

/// Largest scale at which the whole page fits the container, clamped into
/// `[min_scale_for_screen, MAX_SCALE]`.
pub fn responsive_scale(page: Viewport, layout: &Layout) -> f32 {
    let floor = min_scale_for_screen(layout.screen_width);
    if page.width <= 0.0 || page.height <= 0.0 {
        return floor;
    }

    let fit_x = layout.container_width * FIT_MARGIN / page.width;
    let fit_y = layout.container_height * FIT_MARGIN / page.height;

    fit_x.min(fit_y).clamp(floor, MAX_SCALE)
}

/// Current zoom of the desktop surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    manual: bool,
    scale: f32,
}

impl ZoomState {
    const DEFAULT_SCALE: f32 = 1.5;

    pub fn new() -> Self {
        Self {
            manual: false,
            scale: Self::DEFAULT_SCALE,
        }
    }

    pub fn manual(scale: f32) -> Self {
        Self {
            manual: true,
            scale: scale.max(MIN_MANUAL_SCALE),
        }
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scale for the next render. In automatic mode the fitted value also
    /// becomes the base for the next manual step.
    pub fn resolve(&mut self, page: Viewport, layout: &Layout) -> f32 {
        if !self.manual {
            self.scale = responsive_scale(page, layout);
        }
        self.scale
    }

    pub fn zoom_in(&mut self) {
        self.manual = true;
        self.scale += ZOOM_STEP;
    }

    /// Refuses a step that would land below `MIN_MANUAL_SCALE`.
    pub fn zoom_out(&mut self) -> bool {
        let next = self.scale - ZOOM_STEP;
        if next + FLOOR_TOLERANCE < MIN_MANUAL_SCALE {
            return false;
        }
        self.manual = true;
        self.scale = next.max(MIN_MANUAL_SCALE);
        true
    }

    /// Back to automatic fitting.
    pub fn reset(&mut self) {
        self.manual = false;
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new()
    }
}
