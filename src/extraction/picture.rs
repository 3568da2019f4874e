//! Standalone image extraction: enhance, then OCR.

use std::path::Path;

use tracing::debug;

use super::enhance::EnhancementPipeline;
use super::types::{ExtractionMode, OcrEngine, RawText, TextSource};
use super::ExtractionError;

pub fn extract_image(
    path: &Path,
    mode: ExtractionMode,
    ocr: &dyn OcrEngine,
) -> Result<RawText, ExtractionError> {
    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => ExtractionError::Io(io),
        other => ExtractionError::ImageProcessing(other.to_string()),
    })?;
    let rgb = image.to_rgb8();

    debug!(
        width = rgb.width(),
        height = rgb.height(),
        ?mode,
        "Running OCR on image"
    );

    let prepared = EnhancementPipeline::for_image().run(&rgb, mode);
    let text = ocr.recognize(&prepared, mode)?;

    Ok(RawText {
        text,
        source: TextSource::Ocr,
    })
}
