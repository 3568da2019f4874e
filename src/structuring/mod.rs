pub mod completion;
pub mod engine;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod types;

pub use engine::StructuringEngine;
pub use ollama::OllamaClient;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("input text too short (minimum {min} characters)")]
    InsufficientText { min: usize },

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("no JSON found in model response")]
    UnparsableResponse { raw: String },

    #[error("malformed JSON in model response: {reason}")]
    MalformedJson { raw: String, reason: String },
}

impl StructuringError {
    /// Stable machine-readable code carried in failure envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientText { .. } => "InsufficientText",
            Self::ModelUnavailable(_) => "ModelUnavailable",
            Self::UnparsableResponse { .. } => "UnparsableResponse",
            Self::MalformedJson { .. } => "MalformedJSON",
        }
    }

    /// The verbatim model response, for errors that have one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::UnparsableResponse { raw } | Self::MalformedJson { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
