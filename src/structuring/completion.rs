//! Record completion: normalize a parsed model response into a
//! `MedicalRecord` with every field present.

use serde_json::Value;
use tracing::debug;

use super::types::{MedicalRecord, Medication, RecordType};

/// The nine output fields, in envelope order.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "record_date",
    "diagnosis",
    "symptoms",
    "treatments",
    "medications",
    "doctor_name",
    "hospital",
    "notes",
    "record_type",
];

/// Build a complete record from a parsed JSON object. Missing or null
/// fields become empty strings, non-string scalars are stringified, and
/// unknown extra keys are dropped. The "take medication as prescribed"
/// fallback for `treatments` is the prompt's job, not ours; an absent
/// field stays empty here.
pub fn complete_record(obj: &Value) -> MedicalRecord {
    let field = |name: &str| {
        obj.get(name)
            .map(value_to_string)
            .unwrap_or_default()
    };

    MedicalRecord {
        record_date: field("record_date"),
        diagnosis: field("diagnosis"),
        symptoms: field("symptoms"),
        treatments: field("treatments"),
        medications: normalize_medications(obj.get("medications")),
        doctor_name: field("doctor_name"),
        hospital: field("hospital"),
        notes: field("notes"),
        record_type: coerce_record_type(obj.get("record_type")),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Composite values are kept as their JSON text rather than lost.
        other => other.to_string(),
    }
}

/// Re-encode the medications array as a canonical JSON string. Each entry
/// keeps exactly the four known attributes; non-object entries are
/// skipped. Strings pass through untouched.
fn normalize_medications(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => {
            let meds: Vec<Medication> =
                items.iter().filter_map(medication_from_value).collect();
            serde_json::to_string(&meds).unwrap_or_default()
        }
        Some(other) => value_to_string(other),
    }
}

fn medication_from_value(value: &Value) -> Option<Medication> {
    let obj = value.as_object()?;
    let attr = |name: &str| obj.get(name).map(value_to_string).unwrap_or_default();
    Some(Medication {
        name: attr("name"),
        dosage: attr("dosage"),
        instructions: attr("instructions"),
        duration: attr("duration"),
    })
}

fn coerce_record_type(value: Option<&Value>) -> RecordType {
    let raw = value.and_then(Value::as_str).unwrap_or("");
    RecordType::parse(raw).unwrap_or_else(|| {
        if !raw.is_empty() {
            debug!(value = raw, "Unknown record_type, coercing to other");
        }
        RecordType::Other
    })
}
