//! Narrow-screen layout: every page drawn once, top to bottom, into its own
//! surface inside a scroll container.

use tracing::{error, info};

use crate::document::{DocumentHandle, Surface, Viewport};
use crate::error::RenderError;

const MIN_SCROLL_SCALE: f32 = 1.5;
const MAX_SCROLL_SCALE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollLayout {
    pub container_width: f32,
    pub device_pixel_ratio: f32,
}

impl ScrollLayout {
    pub fn new(container_width: f32, device_pixel_ratio: f32) -> Self {
        Self {
            container_width,
            device_pixel_ratio,
        }
    }
}

/// Width-fitting scale scaled up for high-density screens, kept within
/// `[1.5, 3.0]` so text stays sharp without blowing up memory.
pub fn scroll_scale(page: Viewport, layout: &ScrollLayout) -> f32 {
    if page.width <= 0.0 {
        return MIN_SCROLL_SCALE;
    }
    (layout.container_width / page.width * layout.device_pixel_ratio)
        .max(MIN_SCROLL_SCALE)
        .min(MAX_SCROLL_SCALE)
}

/// Receives one fresh surface per page, in page order. Every page of the
/// document gets a slot; a page that fails to fetch or draw leaves its slot
/// blank.
pub trait ScrollContainer: Send {
    fn append_page(&mut self, page: u32) -> &mut dyn Surface;
}

impl<S: Surface + Default> ScrollContainer for Vec<(u32, S)> {
    fn append_page(&mut self, page: u32) -> &mut dyn Surface {
        self.push((page, S::default()));
        let index = self.len() - 1;
        &mut self[index].1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollReport {
    pub rendered: Vec<u32>,
    pub failed: Vec<u32>,
}

/// Draw pages one after another. A failing page is logged and skipped; it
/// never stops the rest of the document.
pub async fn render_all_pages(
    document: &dyn DocumentHandle,
    layout: &ScrollLayout,
    container: &mut dyn ScrollContainer,
) -> ScrollReport {
    let mut report = ScrollReport::default();

    for page in 1..=document.page_count() {
        match render_one(document, layout, container, page).await {
            Ok(()) => report.rendered.push(page),
            Err(err) => {
                error!(page, error = %err, "error rendering page");
                report.failed.push(page);
            }
        }
    }

    info!(
        rendered = report.rendered.len(),
        failed = report.failed.len(),
        "scroll layout ready"
    );
    report
}

async fn render_one(
    document: &dyn DocumentHandle,
    layout: &ScrollLayout,
    container: &mut dyn ScrollContainer,
    page_number: u32,
) -> Result<(), RenderError> {
    let surface = container.append_page(page_number);
    let page = document
        .get_page(page_number)
        .await
        .map_err(|source| RenderError::Fetch {
            page: page_number,
            source,
        })?;

    let scale = scroll_scale(page.viewport(1.0), layout);
    let viewport = page.viewport(scale);
    let (width, height) = viewport.pixel_size();

    surface.resize(width, height);
    page.render(surface, viewport)
        .await
        .map_err(|source| RenderError::Draw {
            page: page_number,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Canvas;
    use crate::testing::FakeDocument;
    use pretty_assertions::assert_eq;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn scale_has_floor_and_cap() {
        let page = Viewport::new(600.0, 800.0);
        assert!(approx(scroll_scale(page, &ScrollLayout::new(360.0, 2.0)), 1.5));
        assert!(approx(scroll_scale(page, &ScrollLayout::new(390.0, 3.0)), 1.95));
        assert!(approx(scroll_scale(page, &ScrollLayout::new(700.0, 3.0)), 3.0));
    }

    #[tokio::test]
    async fn renders_every_page_in_order() {
        let document = FakeDocument::new(4);
        let mut container: Vec<(u32, Canvas)> = Vec::new();

        let report =
            render_all_pages(document.as_ref(), &ScrollLayout::new(400.0, 2.0), &mut container)
                .await;

        assert_eq!(report.rendered, vec![1, 2, 3, 4]);
        assert_eq!(document.drawn(), vec![1, 2, 3, 4]);
        assert_eq!(
            container.iter().map(|(page, _)| *page).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        // 400 / 800 * 2 = 1.0, lifted to the 1.5 floor
        assert_eq!(container[0].1.size(), (1200, 900));
    }

    #[tokio::test]
    async fn failed_page_does_not_stop_the_rest() {
        let document = FakeDocument::new(4);
        document.fail_page(2);
        document.fail_fetch(3);
        let mut container: Vec<(u32, Canvas)> = Vec::new();

        let report =
            render_all_pages(document.as_ref(), &ScrollLayout::new(400.0, 1.0), &mut container)
                .await;

        assert_eq!(report.rendered, vec![1, 4]);
        assert_eq!(report.failed, vec![2, 3]);
        assert_eq!(
            container.iter().map(|(page, _)| *page).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        // Fetch failed before any sizing, so that slot stays empty.
        assert_eq!(container[2].1.size(), (0, 0));
        assert_eq!(container[3].1.size(), (1200, 900));
    }
}
