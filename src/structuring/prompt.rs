//! Prompt assembly for the structuring model.

use super::types::TREATMENTS_FALLBACK;

/// Build the single-turn structuring prompt. The raw document text is
/// embedded verbatim; the instructions pin the output schema so the
/// response can be parsed mechanically.
pub fn build_structuring_prompt(raw_text: &str) -> String {
    format!(
        r#"Analyze the following medical record text and extract the information into JSON.
The text may come from OCR and can contain recognition errors; infer the intended
content where the errors are obvious.

Medical record text:
{raw_text}

Extract exactly these fields; use an empty string ("") for any field the text does not mention:
- record_date: date of the visit in YYYY-MM-DD format (example: "2023-12-31")
- diagnosis: the main diagnosis
- symptoms: symptoms described in the record
- treatments: treatment instructions, excluding medication details; if none are stated, use "{TREATMENTS_FALLBACK}"
- medications: a JSON array of objects with keys "name", "dosage", "instructions", "duration", for example:
  [{{"name": "Paracetamol", "dosage": "500mg", "instructions": "after meals", "duration": "7 days"}}]
- doctor_name: name of the attending doctor
- hospital: name of the hospital, clinic, or medical center
- notes: any remaining remarks, follow-up appointments, or advice
- record_type: exactly one of "checkup", "hospitalization", "surgery", "other"

Return JSON with EXACTLY the fields above; do not omit any field.

Pay attention to:
1. The JSON must be valid and syntactically correct.
2. medications must be a JSON array when data exists, or an empty array ([]) when it does not.
3. The OCR text may contain recognition errors; infer the intended information sensibly.
4. record_type must be one of the four listed values and nothing else.
5. Fix obvious misspellings using the medical and patient-information context.

Return ONLY the JSON object, with no explanation or extra information."#
    )
}
