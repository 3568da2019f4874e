//! Text recognition via the external Tesseract binary.
//!
//! The engine runs with `--oem 3 --psm 6` (single uniform block of text)
//! and a two-language pair. In `Processed` mode a second TSV invocation
//! provides word-level metadata used to reconstruct line layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbImage;
use tracing::{debug, warn};

use super::types::{ExtractionMode, OcrEngine};
use super::ExtractionError;
use crate::config::OcrConfig;

pub struct TesseractOcr {
    binary: PathBuf,
    languages: String,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            languages: config.languages.clone(),
        }
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Run the binary against an image file. `output_format` selects an
    /// alternative stdout renderer (e.g. "tsv"); `None` yields plain text.
    fn run(&self, image_path: &Path, output_format: Option<&str>) -> Result<String, ExtractionError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path)
            .arg("stdout")
            .args(["--oem", "3", "--psm", "6", "-l", &self.languages]);
        if let Some(format) = output_format {
            cmd.arg(format);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractionError::OcrUnavailable(format!(
                    "{} not found (install tesseract-ocr or set MEDREC_TESSERACT)",
                    self.binary.display()
                ))
            } else {
                ExtractionError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::OcrFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(
        &self,
        image: &RgbImage,
        mode: ExtractionMode,
    ) -> Result<String, ExtractionError> {
        let file = tempfile::Builder::new()
            .prefix("medrec-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.save(file.path()).map_err(|e| {
            ExtractionError::ImageProcessing(format!("failed to write OCR input: {e}"))
        })?;

        let text = self.run(file.path(), None)?;

        if mode == ExtractionMode::Processed {
            match self.run(file.path(), Some("tsv")) {
                Ok(tsv) => {
                    let words = parse_tsv_words(&tsv);
                    if let Some(reconstructed) = reconstruct_lines(&words) {
                        debug!(
                            words = words.len(),
                            "Reconstructed line layout from word metadata"
                        );
                        return Ok(reconstructed);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "TSV metadata unavailable, keeping raw OCR output");
                }
            }
        }

        Ok(text)
    }
}

/// Word-level recognition metadata from a TSV row.
/// Columns: level page_num block_num par_num line_num word_num
///          left top width height conf text. Level 5 rows are words.
#[derive(Debug)]
struct TsvWord {
    text: String,
    line: u32,
    #[allow(dead_code)]
    confidence: f32,
}

fn parse_tsv_words(tsv: &str) -> Vec<TsvWord> {
    let mut words = Vec::new();

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = match fields[0].parse() {
            Ok(l) => l,
            Err(_) => continue,
        };
        if level != 5 {
            continue;
        }

        let line: u32 = match fields[4].parse() {
            Ok(l) => l,
            Err(_) => continue,
        };

        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        // -1 marks words the engine could not score.
        let conf: i32 = fields[10].parse().unwrap_or(-1);
        let confidence = if conf < 0 { 0.0 } else { conf as f32 / 100.0 };

        words.push(TsvWord {
            text: text.to_string(),
            line,
            confidence,
        });
    }

    words
}

/// Group non-empty words by ascending line index, join words with single
/// spaces and lines with newlines. Returns `None` when no line could be
/// reconstructed, in which case the caller keeps the raw engine output.
fn reconstruct_lines(words: &[TsvWord]) -> Option<String> {
    let mut lines: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for word in words {
        lines.entry(word.line).or_default().push(&word.text);
    }

    if lines.is_empty() {
        return None;
    }

    Some(
        lines
            .values()
            .map(|words| words.join(" "))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Mock OCR engine returning fixed text, for tests without Tesseract.
pub struct MockOcrEngine {
    text: String,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(
        &self,
        _image: &RgbImage,
        _mode: ExtractionMode,
    ) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV_HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn tsv_parser_keeps_word_rows_only() {
        let tsv = format!(
            "{TSV_HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t600\t800\t-1\t\n\
             4\t1\t1\t1\t1\t0\t10\t20\t200\t30\t-1\t\n\
             5\t1\t1\t1\t1\t1\t10\t20\t80\t30\t95\tParacetamol\n\
             5\t1\t1\t1\t1\t2\t100\t20\t60\t30\t88\t500mg"
        );
        let words = parse_tsv_words(&tsv);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Paracetamol");
        assert_eq!(words[0].line, 1);
        assert!((words[1].confidence - 0.88).abs() < f32::EPSILON);
    }

    #[test]
    fn tsv_parser_skips_empty_and_malformed_rows() {
        let tsv = format!(
            "{TSV_HEADER}\n\
             too\tfew\tfields\n\
             5\t1\t1\t1\t1\t1\t10\t20\t80\t30\t90\t\n\
             5\t1\t1\t1\t2\t1\t10\t60\t80\t30\t85\tvalid"
        );
        let words = parse_tsv_words(&tsv);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "valid");
    }

    #[test]
    fn tsv_parser_zeroes_negative_confidence() {
        let tsv = format!("{TSV_HEADER}\n5\t1\t1\t1\t1\t1\t10\t20\t80\t30\t-1\tgarbled");
        let words = parse_tsv_words(&tsv);
        assert_eq!(words.len(), 1);
        assert!((words[0].confidence - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn lines_reconstructed_in_ascending_order() {
        let words = vec![
            TsvWord { text: "twice".into(), line: 2, confidence: 0.8 },
            TsvWord { text: "Metformin".into(), line: 1, confidence: 0.9 },
            TsvWord { text: "daily".into(), line: 2, confidence: 0.8 },
            TsvWord { text: "500mg".into(), line: 1, confidence: 0.9 },
        ];
        let text = reconstruct_lines(&words).unwrap();
        assert_eq!(text, "Metformin 500mg\ntwice daily");
    }

    #[test]
    fn no_words_keeps_raw_output() {
        assert!(reconstruct_lines(&[]).is_none());
    }

    #[test]
    fn mock_engine_returns_configured_text() {
        let engine = MockOcrEngine::new("Blood pressure normal");
        let img = RgbImage::new(4, 4);
        let text = engine.recognize(&img, ExtractionMode::Processed).unwrap();
        assert_eq!(text, "Blood pressure normal");
    }
}
