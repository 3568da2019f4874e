//! Format detection and extraction entry point.

use std::path::Path;

use tracing::{info, warn};

use super::ocr::TesseractOcr;
use super::pdf::PdfExtractor;
use super::picture::extract_image;
use super::render::PdfiumRenderer;
use super::text::read_plain_text;
use super::types::{
    CancelToken, DocumentFormat, ExtractionMode, OcrEngine, PdfPageRenderer, RawText, TextSource,
};
use super::word::extract_docx;
use super::ExtractionError;
use crate::config::{PdfConfig, PipelineConfig};

/// Map a file path to a supported format by its extension
/// (case-insensitive). Unknown or missing extensions return `None`.
pub fn detect_format(path: &Path) -> Option<DocumentFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" => Some(DocumentFormat::PlainText),
        "docx" => Some(DocumentFormat::Word),
        "pdf" => Some(DocumentFormat::Pdf),
        "png" | "jpg" | "jpeg" | "bmp" | "tiff" => Some(DocumentFormat::Image),
        _ => None,
    }
}

/// Routes a document to the extractor for its format.
pub struct Extractor {
    ocr: Box<dyn OcrEngine>,
    renderer: Box<dyn PdfPageRenderer>,
    pdf_config: PdfConfig,
}

impl Extractor {
    /// Build with the production engines (Tesseract binary + PDFium).
    pub fn from_config(config: &PipelineConfig) -> Self {
        let ocr = TesseractOcr::new(&config.ocr);
        if !ocr.is_available() {
            warn!(
                binary = %config.ocr.binary.display(),
                "Tesseract not found; OCR-dependent formats will fail"
            );
        }
        Self {
            ocr: Box::new(ocr),
            renderer: Box::new(PdfiumRenderer::new()),
            pdf_config: config.pdf.clone(),
        }
    }

    /// Build with caller-supplied engines, mainly for tests.
    pub fn with_engines(
        ocr: Box<dyn OcrEngine>,
        renderer: Box<dyn PdfPageRenderer>,
        pdf_config: PdfConfig,
    ) -> Self {
        Self {
            ocr,
            renderer,
            pdf_config,
        }
    }

    pub fn extract(&self, path: &Path, mode: ExtractionMode) -> Result<RawText, ExtractionError> {
        self.extract_with_cancel(path, mode, &CancelToken::new())
    }

    pub fn extract_with_cancel(
        &self,
        path: &Path,
        mode: ExtractionMode,
        cancel: &CancelToken,
    ) -> Result<RawText, ExtractionError> {
        let format = detect_format(path).ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)");
            ExtractionError::UnsupportedFormat(ext.to_string())
        })?;

        info!(path = %path.display(), ?format, ?mode, "Extracting document");

        match format {
            DocumentFormat::PlainText => Ok(RawText {
                text: read_plain_text(path)?,
                source: TextSource::DirectLayer,
            }),
            DocumentFormat::Word => Ok(RawText {
                text: extract_docx(path)?,
                source: TextSource::DirectLayer,
            }),
            DocumentFormat::Pdf => {
                let bytes = std::fs::read(path)?;
                PdfExtractor::new(self.renderer.as_ref(), self.ocr.as_ref(), &self.pdf_config)
                    .extract(&bytes, mode, cancel)
            }
            DocumentFormat::Image => extract_image(path, mode, self.ocr.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ocr::MockOcrEngine;
    use crate::extraction::render::MockPdfPageRenderer;
    use std::io::Write;

    fn test_extractor() -> Extractor {
        Extractor::with_engines(
            Box::new(MockOcrEngine::new("ocr text")),
            Box::new(MockPdfPageRenderer::new(1)),
            PdfConfig::default(),
        )
    }

    #[test]
    fn formats_detected_by_extension() {
        assert_eq!(
            detect_format(Path::new("a.txt")),
            Some(DocumentFormat::PlainText)
        );
        assert_eq!(
            detect_format(Path::new("a.docx")),
            Some(DocumentFormat::Word)
        );
        assert_eq!(detect_format(Path::new("a.PDF")), Some(DocumentFormat::Pdf));
        assert_eq!(
            detect_format(Path::new("scan.JPEG")),
            Some(DocumentFormat::Image)
        );
        assert_eq!(
            detect_format(Path::new("scan.tiff")),
            Some(DocumentFormat::Image)
        );
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        assert_eq!(detect_format(Path::new("a.doc")), None);
        assert_eq!(detect_format(Path::new("a.gif")), None);
        assert_eq!(detect_format(Path::new("no_extension")), None);
    }

    #[test]
    fn unsupported_format_error_names_the_extension() {
        let file = tempfile::Builder::new().suffix(".doc").tempfile().unwrap();
        let err = test_extractor()
            .extract(file.path(), ExtractionMode::Original)
            .unwrap_err();
        match err {
            ExtractionError::UnsupportedFormat(ext) => assert_eq!(ext, "doc"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plain_text_route() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Diagnosis: flu").unwrap();
        let raw = test_extractor()
            .extract(file.path(), ExtractionMode::Original)
            .unwrap();
        assert_eq!(raw.text, "Diagnosis: flu");
        assert_eq!(raw.source, TextSource::DirectLayer);
    }
}
