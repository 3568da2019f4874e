use serde::{Deserialize, Serialize};

use super::StructuringError;

/// Default `treatments` value when the model leaves the field empty.
pub const TREATMENTS_FALLBACK: &str = "Take medication as prescribed";

/// Category of a medical record visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Checkup,
    Hospitalization,
    Surgery,
    #[default]
    Other,
}

impl RecordType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "checkup" => Some(Self::Checkup),
            "hospitalization" => Some(Self::Hospitalization),
            "surgery" => Some(Self::Surgery),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkup => "checkup",
            Self::Hospitalization => "hospitalization",
            Self::Surgery => "surgery",
            Self::Other => "other",
        }
    }
}

/// A structured medical record. Every field is always present; fields the
/// source document does not mention are empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub record_date: String,
    pub diagnosis: String,
    pub symptoms: String,
    pub treatments: String,
    pub medications: String,
    pub doctor_name: String,
    pub hospital: String,
    pub notes: String,
    pub record_type: RecordType,
}

/// One medication entry inside the `medications` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub instructions: String,
    pub duration: String,
}

/// Uniform result wrapper returned to callers. Exactly one of `data` and
/// `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MedicalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl Envelope {
    pub fn success(record: MedicalRecord) -> Self {
        Self {
            success: true,
            data: Some(record),
            error: None,
            raw_response: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            raw_response: None,
        }
    }

    pub fn from_error(err: &StructuringError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.code().to_string()),
            raw_response: err.raw_response().map(str::to_string),
        }
    }
}

/// Chat-completion client abstraction (allows mocking for tests).
pub trait LlmClient: Send + Sync {
    fn chat(&self, model: &str, prompt: &str) -> Result<String, StructuringError>;
}
