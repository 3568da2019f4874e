//! Orchestrates the structuring steps: guard, prompt, model call, parse,
//! complete.

use serde_json::Value;
use tracing::{info, warn};

use super::completion::complete_record;
use super::ollama::OllamaClient;
use super::parser::extract_json_block;
use super::prompt::build_structuring_prompt;
use super::types::{Envelope, LlmClient, MedicalRecord};
use super::StructuringError;
use crate::config::LlmConfig;

pub struct StructuringEngine {
    llm: Box<dyn LlmClient>,
    model: String,
    min_input_chars: usize,
}

impl StructuringEngine {
    pub fn new(llm: Box<dyn LlmClient>, model: &str, min_input_chars: usize) -> Self {
        Self {
            llm,
            model: model.to_string(),
            min_input_chars,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            Box::new(OllamaClient::from_config(config)),
            &config.model,
            config.min_input_chars,
        )
    }

    /// Structure raw document text into a medical record, wrapped in an
    /// envelope. Never panics and never returns a bare error; every
    /// failure mode maps to a failure envelope.
    pub fn structure(&self, raw_text: &str) -> Envelope {
        match self.try_structure(raw_text) {
            Ok(record) => Envelope::success(record),
            Err(e) => {
                warn!(code = e.code(), error = %e, "Structuring failed");
                Envelope::from_error(&e)
            }
        }
    }

    fn try_structure(&self, raw_text: &str) -> Result<MedicalRecord, StructuringError> {
        let trimmed = raw_text.trim();
        if trimmed.chars().count() < self.min_input_chars {
            return Err(StructuringError::InsufficientText {
                min: self.min_input_chars,
            });
        }

        let prompt = build_structuring_prompt(trimmed);
        let response = self.llm.chat(&self.model, &prompt)?;

        let json_text = extract_json_block(&response).ok_or_else(|| {
            StructuringError::UnparsableResponse {
                raw: response.clone(),
            }
        })?;

        let value: Value =
            serde_json::from_str(&json_text).map_err(|e| StructuringError::MalformedJson {
                raw: response.clone(),
                reason: e.to_string(),
            })?;

        if !value.is_object() {
            return Err(StructuringError::MalformedJson {
                raw: response,
                reason: "top-level JSON value is not an object".to_string(),
            });
        }

        let record = complete_record(&value);
        info!(record_type = record.record_type.as_str(), "Record structured");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structuring::completion::REQUIRED_FIELDS;
    use crate::structuring::ollama::MockLlmClient;
    use crate::structuring::types::RecordType;

    const INPUT: &str =
        "Diagnosis: Sore throat. Medication: Paracetamol 500mg, after meals, 5 days.";

    fn engine_with(response: &str) -> StructuringEngine {
        StructuringEngine::new(Box::new(MockLlmClient::new(response)), "medrec", 10)
    }

    #[test]
    fn well_formed_response_produces_all_nine_fields() {
        let engine = engine_with(
            r#"```json
{"record_date": "2024-03-01", "diagnosis": "Sore throat", "symptoms": "throat pain",
 "treatments": "rest", "medications": [{"name": "Paracetamol", "dosage": "500mg",
 "instructions": "after meals", "duration": "5 days"}],
 "doctor_name": "Dr. Tran", "hospital": "City Clinic", "notes": "",
 "record_type": "checkup"}
```"#,
        );
        let envelope = engine.structure(INPUT);
        assert!(envelope.success);

        let record = envelope.data.unwrap();
        assert_eq!(record.diagnosis, "Sore throat");
        assert_eq!(record.record_type, RecordType::Checkup);

        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), REQUIRED_FIELDS.len());
        for field in REQUIRED_FIELDS {
            assert!(obj.contains_key(field), "missing field {field}");
        }

        let meds: Vec<crate::structuring::types::Medication> =
            serde_json::from_str(&record.medications).unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, "Paracetamol");
    }

    #[test]
    fn sparse_response_is_completed_with_defaults() {
        let engine = engine_with(r#"{"diagnosis": "flu", "record_type": "emergency"}"#);
        let envelope = engine.structure(INPUT);
        assert!(envelope.success);
        let record = envelope.data.unwrap();
        assert_eq!(record.diagnosis, "flu");
        assert_eq!(record.symptoms, "");
        assert_eq!(record.record_type, RecordType::Other);
    }

    #[test]
    fn short_input_fails_without_calling_the_model() {
        struct SharedMock(std::sync::Arc<MockLlmClient>);
        impl LlmClient for SharedMock {
            fn chat(&self, model: &str, prompt: &str) -> Result<String, StructuringError> {
                self.0.chat(model, prompt)
            }
        }

        let mock = std::sync::Arc::new(MockLlmClient::new("{}"));
        let engine = StructuringEngine::new(Box::new(SharedMock(mock.clone())), "medrec", 10);
        let envelope = engine.structure("short");
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("InsufficientText"));
        assert!(envelope.raw_response.is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn whitespace_only_input_is_insufficient() {
        let engine = engine_with("{}");
        let envelope = engine.structure("   \n\t   \n       ");
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("InsufficientText"));
    }

    #[test]
    fn prose_response_is_unparsable_and_carries_the_raw_text() {
        let engine = engine_with("I'm sorry, I cannot read this document.");
        let envelope = engine.structure(INPUT);
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("UnparsableResponse"));
        assert_eq!(
            envelope.raw_response.as_deref(),
            Some("I'm sorry, I cannot read this document.")
        );
    }

    #[test]
    fn broken_json_is_malformed() {
        let engine = engine_with("```json\n{\"diagnosis\": \"flu\",}\n```");
        let envelope = engine.structure(INPUT);
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("MalformedJSON"));
        assert!(envelope.raw_response.is_some());
    }

    #[test]
    fn non_object_json_is_malformed() {
        let engine = engine_with("```json\n[1, 2, 3]\n```");
        let envelope = engine.structure(INPUT);
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("MalformedJSON"));
    }

    #[test]
    fn model_failure_surfaces_as_unavailable() {
        struct FailingClient;
        impl LlmClient for FailingClient {
            fn chat(&self, _model: &str, _prompt: &str) -> Result<String, StructuringError> {
                Err(StructuringError::ModelUnavailable(
                    "connection refused".into(),
                ))
            }
        }
        let engine = StructuringEngine::new(Box::new(FailingClient), "medrec", 10);
        let envelope = engine.structure(INPUT);
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("ModelUnavailable"));
        assert!(envelope.raw_response.is_none());
    }
}
