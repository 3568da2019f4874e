use std::env;
use std::path::PathBuf;

/// Default language pair for OCR: English primary, Vietnamese secondary.
pub const DEFAULT_OCR_LANGUAGES: &str = "eng+vie";

/// Minimum trimmed character count for a PDF text layer to be considered
/// usable; below this the extractor falls back to OCR.
pub const DEFAULT_TEXT_LAYER_THRESHOLD: usize = 100;

/// Minimum trimmed character count required before structuring is attempted.
pub const DEFAULT_MIN_INPUT_CHARS: usize = 10;

/// Rendering DPI for PDF pages on the OCR fallback path.
pub const DEFAULT_RENDER_DPI: u32 = 200;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "medrec";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;

/// OCR engine configuration. The binary location and language pair are
/// deployment concerns, so they come from the environment rather than
/// being hard-coded at the call sites.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract executable: an absolute path or a name resolved on $PATH.
    pub binary: PathBuf,
    /// Language pair passed to the engine, e.g. "eng+vie".
    pub languages: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: env::var_os("MEDREC_TESSERACT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("tesseract")),
            languages: env::var("MEDREC_OCR_LANGS")
                .unwrap_or_else(|_| DEFAULT_OCR_LANGUAGES.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Trimmed-character threshold under which the text layer is treated
    /// as unusable and OCR fallback triggers.
    pub text_layer_threshold: usize,
    /// DPI for rendering pages on the fallback path.
    pub render_dpi: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            text_layer_threshold: DEFAULT_TEXT_LAYER_THRESHOLD,
            render_dpi: DEFAULT_RENDER_DPI,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Inputs shorter than this (trimmed) are rejected before any model call.
    pub min_input_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("MEDREC_OLLAMA_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            model: env::var("MEDREC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            min_input_chars: DEFAULT_MIN_INPUT_CHARS,
        }
    }
}

/// Full pipeline configuration; each call carries its own copy, nothing is
/// process-global.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub ocr: OcrConfig,
    pub pdf: PdfConfig,
    pub llm: LlmConfig,
}
