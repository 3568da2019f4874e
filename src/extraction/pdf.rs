//! PDF text extraction with silent OCR fallback.
//!
//! Digital PDFs are read through their embedded text layer. When that
//! layer is absent or too thin (scanned documents), every page is
//! rendered to a bitmap, enhanced, and run through OCR instead. Callers
//! see one uniform result either way.

use tracing::{debug, info};

use super::enhance::EnhancementPipeline;
use super::types::{CancelToken, ExtractionMode, OcrEngine, PdfPageRenderer, RawText, TextSource};
use super::ExtractionError;
use crate::config::PdfConfig;

pub struct PdfExtractor<'a> {
    renderer: &'a dyn PdfPageRenderer,
    ocr: &'a dyn OcrEngine,
    config: &'a PdfConfig,
}

impl<'a> PdfExtractor<'a> {
    pub fn new(
        renderer: &'a dyn PdfPageRenderer,
        ocr: &'a dyn OcrEngine,
        config: &'a PdfConfig,
    ) -> Self {
        Self {
            renderer,
            ocr,
            config,
        }
    }

    /// Extract text from in-memory PDF bytes. Tries the embedded text
    /// layer first; falls back to page-by-page OCR when the trimmed layer
    /// is shorter than the configured threshold.
    pub fn extract(
        &self,
        pdf_bytes: &[u8],
        mode: ExtractionMode,
        cancel: &CancelToken,
    ) -> Result<RawText, ExtractionError> {
        let text = self.text_layer(pdf_bytes)?;

        if text.trim().chars().count() >= self.config.text_layer_threshold {
            debug!(chars = text.len(), "Using embedded PDF text layer");
            return Ok(RawText {
                text,
                source: TextSource::DirectLayer,
            });
        }

        info!(
            threshold = self.config.text_layer_threshold,
            "Text layer too thin, falling back to OCR"
        );
        self.ocr_fallback(pdf_bytes, mode, cancel)
    }

    fn text_layer(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        Ok(join_pages(pages))
    }

    fn ocr_fallback(
        &self,
        pdf_bytes: &[u8],
        mode: ExtractionMode,
        cancel: &CancelToken,
    ) -> Result<RawText, ExtractionError> {
        let page_count = self.renderer.page_count(pdf_bytes)?;
        let pipeline = EnhancementPipeline::for_pdf_page();
        let mut text = String::new();

        for page in 0..page_count {
            if cancel.is_cancelled() {
                info!(page, page_count, "OCR fallback cancelled");
                return Err(ExtractionError::Cancelled);
            }

            let rendered = self
                .renderer
                .render_page(pdf_bytes, page, self.config.render_dpi)?;
            let prepared = pipeline.run(&rendered, mode);
            let page_text = self.ocr.recognize(&prepared, mode)?;

            debug!(page, chars = page_text.len(), "OCR page complete");
            text.push_str(&page_text);
            text.push_str("\n\n");
        }

        Ok(RawText {
            text,
            source: TextSource::Ocr,
        })
    }
}

/// Join per-page text layers: each non-empty page contributes its text
/// plus a newline, an empty page contributes a bare newline so page
/// positions remain distinguishable.
fn join_pages(pages: Vec<String>) -> String {
    let mut out = String::new();
    for page in pages {
        if !page.is_empty() {
            out.push_str(&page);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ocr::MockOcrEngine;
    use crate::extraction::render::MockPdfPageRenderer;
    use image::RgbImage;
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    /// Build a minimal one-page PDF with the given text in its content
    /// stream.
    fn make_test_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = format!("BT /F1 12 Tf 50 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    struct PanicOcr;
    impl OcrEngine for PanicOcr {
        fn recognize(
            &self,
            _image: &RgbImage,
            _mode: ExtractionMode,
        ) -> Result<String, ExtractionError> {
            panic!("OCR must not run when the text layer suffices");
        }
    }

    struct PanicRenderer;
    impl PdfPageRenderer for PanicRenderer {
        fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
            panic!("renderer must not run when the text layer suffices");
        }
        fn render_page(
            &self,
            _pdf_bytes: &[u8],
            _page_number: usize,
            _dpi: u32,
        ) -> Result<RgbImage, ExtractionError> {
            panic!("renderer must not run when the text layer suffices");
        }
    }

    #[test]
    fn rich_text_layer_skips_ocr() {
        let body = "Patient presented with persistent cough and mild fever. \
                    Prescribed Paracetamol 500mg three times daily after meals.";
        assert!(body.chars().count() >= 100);
        let pdf = make_test_pdf(body);

        let config = PdfConfig::default();
        let extractor = PdfExtractor::new(&PanicRenderer, &PanicOcr, &config);
        let raw = extractor
            .extract(&pdf, ExtractionMode::Processed, &CancelToken::new())
            .unwrap();
        assert_eq!(raw.source, TextSource::DirectLayer);
        assert!(raw.text.contains("Paracetamol"));
    }

    #[test]
    fn thin_text_layer_falls_back_to_ocr() {
        let pdf = make_test_pdf("v1");
        let renderer = MockPdfPageRenderer::new(2);
        let ocr = MockOcrEngine::new("X");

        let config = PdfConfig::default();
        let extractor = PdfExtractor::new(&renderer, &ocr, &config);
        let raw = extractor
            .extract(&pdf, ExtractionMode::Processed, &CancelToken::new())
            .unwrap();
        assert_eq!(raw.source, TextSource::Ocr);
        assert_eq!(raw.text, "X\n\nX\n\n");
    }

    #[test]
    fn cancelled_token_aborts_fallback() {
        let pdf = make_test_pdf("v1");
        let renderer = MockPdfPageRenderer::new(3);
        let ocr = MockOcrEngine::new("X");

        let token = CancelToken::new();
        token.cancel();

        let config = PdfConfig::default();
        let extractor = PdfExtractor::new(&renderer, &ocr, &config);
        let err = extractor
            .extract(&pdf, ExtractionMode::Processed, &token)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Cancelled));
    }

    #[test]
    fn garbage_bytes_are_pdf_parsing_error() {
        let config = PdfConfig::default();
        let renderer = MockPdfPageRenderer::new(0);
        let extractor = PdfExtractor::new(&renderer, &PanicOcr, &config);
        let err = extractor
            .extract(b"not a pdf", ExtractionMode::Original, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::PdfParsing(_)));
    }

    #[test]
    fn join_pages_keeps_empty_page_positions() {
        let joined = join_pages(vec!["one".into(), String::new(), "three".into()]);
        assert_eq!(joined, "one\n\nthree\n");
    }

    #[test]
    fn join_pages_empty_input_is_empty() {
        assert_eq!(join_pages(Vec::new()), "");
    }
}
