//! Seams to the document loader and the drawing target.
//!
//! Parsing and rasterising PDF content is not done here. A loader hands back
//! a [`DocumentHandle`]; pages are fetched from it asynchronously and drawn
//! onto a [`Surface`].

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Page dimensions at a given scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, scale: f32) -> Self {
        Self::new(self.width * scale, self.height * scale)
    }

    /// Whole-pixel size of a surface able to hold this viewport.
    pub fn pixel_size(self) -> (u32, u32) {
        (
            self.width.max(0.0).round() as u32,
            self.height.max(0.0).round() as u32,
        )
    }
}

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// `on_progress(loaded, total)` is called as bytes arrive.
    async fn load(
        &self,
        locator: &str,
        on_progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<Arc<dyn DocumentHandle>>;
}

/// A loaded document. Immutable once loaded.
#[async_trait]
pub trait DocumentHandle: Send + Sync {
    /// Always at least 1.
    fn page_count(&self) -> u32;

    /// `page` is 1-based.
    async fn get_page(&self, page: u32) -> Result<Arc<dyn Page>>;
}

#[async_trait]
pub trait Page: Send + Sync {
    fn viewport(&self, scale: f32) -> Viewport;

    /// Draw into `surface`, which has already been sized to `viewport`.
    async fn render(&self, surface: &mut dyn Surface, viewport: Viewport) -> Result<()>;
}

/// Mutable RGBA drawing target.
pub trait Surface: Send {
    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    /// Row-major RGBA, `width * height * 4` bytes.
    fn pixels_mut(&mut self) -> &mut [u8];
}

/// In-memory RGBA surface.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

impl Surface for Canvas {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        // Resizing a canvas clears it.
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

// Manual Debug impl so test failures don't dump the whole pixel buffer
impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
