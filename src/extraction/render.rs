//! PDF page rasterization for the OCR fallback path, backed by PDFium.
//!
//! The upstream `Pdfium` handle is `!Send`, so `PdfiumRenderer` stays
//! stateless and loads the library on every call. Library loads after the
//! first are served from the OS dlopen cache.

use image::{Rgb, RgbImage};
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PdfPageRenderer;
use super::ExtractionError;

/// Longest edge allowed for a rendered page. Guards against huge pages
/// blowing up memory before OCR even starts.
const MAX_EDGE_PX: u32 = 4096;

const POINTS_PER_INCH: f32 = 72.0;

pub struct PdfiumRenderer;

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfiumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate and bind the PDFium dynamic library: explicit
/// `PDFIUM_DYNAMIC_LIB_PATH` first, then next to the executable, then the
/// system search path.
fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let bindings =
            Pdfium::bind_to_library(&path).map_err(|e| ExtractionError::PdfRendering {
                page: 0,
                reason: format!("PDFIUM_DYNAMIC_LIB_PATH={path} did not load: {e}"),
            })?;
        debug!(path = %path, "PDFium loaded from env var");
        return Ok(Pdfium::new(bindings));
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.to_path_buf()));
    if let Some(dir) = exe_dir {
        let candidate = Pdfium::pdfium_platform_library_name_at_path(dir.to_string_lossy().as_ref());
        if let Ok(bindings) = Pdfium::bind_to_library(&candidate) {
            debug!(dir = %dir.display(), "PDFium loaded from executable directory");
            return Ok(Pdfium::new(bindings));
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| ExtractionError::PdfRendering {
            page: 0,
            reason: format!(
                "no PDFium library found (install it or set PDFIUM_DYNAMIC_LIB_PATH): {e}"
            ),
        })
}

/// Pixel size for a page at the requested DPI, shrunk uniformly when the
/// longest edge would exceed `MAX_EDGE_PX`. The bool reports whether the
/// cap kicked in.
fn target_size(width_pts: f32, height_pts: f32, dpi: u32) -> (u32, u32, bool) {
    let mut scale = dpi as f32 / POINTS_PER_INCH;
    let longest = width_pts.max(height_pts) * scale;
    let capped = longest > MAX_EDGE_PX as f32;
    if capped {
        scale *= MAX_EDGE_PX as f32 / longest;
    }
    let px = |pts: f32| ((pts * scale).round() as u32).clamp(1, MAX_EDGE_PX);
    (px(width_pts), px(height_pts), capped)
}

impl PdfPageRenderer for PdfiumRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| ExtractionError::PdfParsing(format!("PDFium rejected document: {e}")))?;
        Ok(document.pages().len() as usize)
    }

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<RgbImage, ExtractionError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| ExtractionError::PdfParsing(format!("PDFium rejected document: {e}")))?;
        let pages = document.pages();

        let index = u16::try_from(page_number)
            .ok()
            .filter(|i| (*i as usize) < pages.len() as usize)
            .ok_or_else(|| ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("page index out of range, document has {} pages", pages.len()),
            })?;
        let page = pages.get(index).map_err(|e| ExtractionError::PdfRendering {
            page: page_number,
            reason: e.to_string(),
        })?;

        let (w, h, capped) = target_size(page.width().value, page.height().value, dpi);
        if capped {
            warn!(page = page_number, width = w, height = h, "Oversized page scaled down");
        }

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(w as i32)
                    .set_maximum_height(h as i32),
            )
            .map_err(|e| ExtractionError::PdfRendering {
                page: page_number,
                reason: e.to_string(),
            })?;

        let rendered = bitmap.as_image().to_rgb8();
        debug!(
            page = page_number,
            width = rendered.width(),
            height = rendered.height(),
            "Page rasterized"
        );
        Ok(rendered)
    }
}

/// Mock renderer producing blank white pages, for tests that must not
/// depend on the PDFium binary.
pub struct MockPdfPageRenderer {
    page_count: usize,
}

impl MockPdfPageRenderer {
    pub fn new(page_count: usize) -> Self {
        Self { page_count }
    }
}

impl PdfPageRenderer for MockPdfPageRenderer {
    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        Ok(self.page_count)
    }

    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_number: usize,
        _dpi: u32,
    ) -> Result<RgbImage, ExtractionError> {
        if page_number >= self.page_count {
            return Err(ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("mock has only {} pages", self.page_count),
            });
        }
        Ok(RgbImage::from_pixel(64, 64, Rgb([255, 255, 255])))
    }
}
