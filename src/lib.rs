//! Medical-record extraction and structuring pipeline.
//!
//! Takes a document (plain text, DOCX, PDF, or a scanned image), pulls
//! raw text out of it (direct layers where available, OCR otherwise),
//! and turns that text into a structured medical record via a local
//! language model.

pub mod config;
pub mod extraction;
pub mod structuring;
