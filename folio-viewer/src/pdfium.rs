//! PDFium-backed document loader used by the `folio` front-end.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use tokio::io::AsyncReadExt;

use crate::document::{DocumentHandle, DocumentLoader, Page, Surface, Viewport};

const READ_CHUNK: usize = 64 * 1024;

/// Loads documents from the local filesystem and rasterises them with PDFium.
pub struct PdfiumLoader {
    pdfium: &'static Pdfium,
}

impl PdfiumLoader {
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?;
        // Documents borrow the library for their whole lifetime and the
        // front-end keeps one loader per process.
        let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));
        Ok(Self { pdfium })
    }
}

#[async_trait]
impl DocumentLoader for PdfiumLoader {
    async fn load(
        &self,
        locator: &str,
        on_progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<Arc<dyn DocumentHandle>> {
        let mut file = tokio::fs::File::open(locator)
            .await
            .with_context(|| format!("Failed to open {locator}"))?;
        let total = file.metadata().await?.len();

        let mut bytes = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..read]);
            on_progress(bytes.len() as u64, total);
        }

        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .context("Failed to load PDF document")?;
        let page_count = u32::from(document.pages().len());
        if page_count == 0 {
            return Err(anyhow!("{locator} has no pages"));
        }

        Ok(Arc::new(PdfiumDocument {
            inner: Arc::new(Mutex::new(document)),
            page_count,
        }))
    }
}

type SharedDocument = Arc<Mutex<PdfDocument<'static>>>;

struct PdfiumDocument {
    inner: SharedDocument,
    page_count: u32,
}

fn page_index(page: u32) -> Result<u16> {
    page.checked_sub(1)
        .and_then(|index| u16::try_from(index).ok())
        .ok_or_else(|| anyhow!("Page {page} out of bounds"))
}

#[async_trait]
impl DocumentHandle for PdfiumDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    async fn get_page(&self, page: u32) -> Result<Arc<dyn Page>> {
        let index = page_index(page)?;
        let size = {
            let document = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let pdf_page = document
                .pages()
                .get(index)
                .context("Page index out of bounds")?;
            Viewport::new(pdf_page.width().value, pdf_page.height().value)
        };
        Ok(Arc::new(PdfiumPage {
            document: self.inner.clone(),
            index,
            size,
        }))
    }
}

struct PdfiumPage {
    document: SharedDocument,
    index: u16,
    size: Viewport,
}

#[async_trait]
impl Page for PdfiumPage {
    fn viewport(&self, scale: f32) -> Viewport {
        self.size.scaled(scale)
    }

    async fn render(&self, surface: &mut dyn Surface, _viewport: Viewport) -> Result<()> {
        let (width, height) = surface.size();
        let rgba = {
            let document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
            let page = document
                .pages()
                .get(self.index)
                .context("Page index out of bounds")?;

            let render_config = PdfRenderConfig::new()
                .set_target_width(width as i32)
                .set_target_height(height as i32);

            let bitmap = page
                .render_with_config(&render_config)
                .context("Failed to render page")?;
            bitmap.as_rgba_bytes().to_vec()
        };

        let pixels = surface.pixels_mut();
        let len = pixels.len().min(rgba.len());
        pixels[..len].copy_from_slice(&rgba[..len]);
        Ok(())
    }
}
