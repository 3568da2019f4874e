pub mod types;
pub mod dispatch;
pub mod text;
pub mod word;
pub mod pdf;
pub mod render;
pub mod enhance;
pub mod ocr;
pub mod picture;

pub use types::*;
pub use dispatch::*;
pub use pdf::*;
pub use render::*;
pub use enhance::*;
pub use ocr::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF page {page} rendering failed: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("Word document parsing failed: {0}")]
    WordParsing(String),

    #[error("image processing error: {0}")]
    ImageProcessing(String),

    #[error("OCR engine not available: {0}")]
    OcrUnavailable(String),

    #[error("OCR processing failed: {0}")]
    OcrFailed(String),

    #[error("extraction cancelled")]
    Cancelled,
}
