use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Supported input formats. Derived once from the file extension and
/// immutable for the duration of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    PlainText,
    Word,
    Pdf,
    Image,
}

/// Whether OCR runs on raw pixels or on the enhancement chain's output.
/// Passed through from the caller to every OCR invocation; never stored
/// globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Original,
    Processed,
}

/// Provenance of extracted text. Informational only; downstream consumers
/// treat both sources uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSource {
    DirectLayer,
    Ocr,
}

/// Raw text extracted from a document, tagged with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawText {
    pub text: String,
    pub source: TextSource,
}

/// Cooperative cancellation handle for multi-page OCR jobs. The PDF
/// fallback checks it before rendering each page, so a long job can be
/// aborted without waiting for the current page to finish downstream work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// OCR engine abstraction (allows mocking for tests).
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a prepared image. In `Processed` mode the engine
    /// additionally reconstructs line layout from word-level metadata.
    fn recognize(&self, image: &RgbImage, mode: ExtractionMode)
        -> Result<String, ExtractionError>;
}

/// Renders PDF pages to bitmaps for the OCR fallback path.
pub trait PdfPageRenderer: Send + Sync {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError>;

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<RgbImage, ExtractionError>;
}
