//! Prompts and declared output schemas.
//!
//! The rubrics and schemas are fixed; only wards and citizen descriptions
//! vary per request. Both are embedded as quoted data.

use serde_json::{json, Value};

use crate::assessment::{
    AssessmentRequest, FIELD_CLEANLINESS_SCORE, FIELD_ESTIMATED_PH, FIELD_ESTIMATED_TURBIDITY,
    FIELD_STATUS_LABEL,
};
use crate::digest::{DigestRequest, FIELD_SUMMARY};
use crate::status::{StatusLabel, MODERATE_MIN_SCORE, SAFE_MIN_SCORE};

/// Build the full instruction text sent alongside the photo.
pub fn build_prompt(request: &AssessmentRequest) -> String {
    let description = request.description().unwrap_or("");
    format!(
        "You are an AI assistant for municipal water quality assessment in Indore.\n\
         Analyze the attached water sample photo.\n\
         Ward: \"{ward}\"\n\
         Citizen description: \"{description}\"\n\
         \n\
         Based on visual cues (color, clarity, suspended particles) and the context:\n\
         1. Estimate {score}: a number from 0 to 1 where 1 is the cleanest water.\n\
         2. Assign {label}: exactly one of \"Safe\", \"Moderate\", \"Unsafe\".\n   \
            Use \"Safe\" when the score is at least {safe}, \"Moderate\" when it is at least \
         {moderate}, otherwise \"Unsafe\".\n\
         3. Estimate {ph}: a pH value from 0 to 14. Neutral is about 7. \
         Acidic or corrosive water is below 6.5. Basic or soapy water is above 8.5.\n\
         4. Estimate {turbidity}: turbidity in NTU, never negative. \
         Clear water is below 1 NTU. Cloudy water is 5 to 10 NTU or more.\n\
         \n\
         Respond with a single JSON object matching the declared schema and nothing else.",
        ward = escape(request.ward()),
        description = escape(description),
        score = FIELD_CLEANLINESS_SCORE,
        label = FIELD_STATUS_LABEL,
        ph = FIELD_ESTIMATED_PH,
        turbidity = FIELD_ESTIMATED_TURBIDITY,
        safe = SAFE_MIN_SCORE,
        moderate = MODERATE_MIN_SCORE,
    )
}

/// The response schema declared to the backend.
///
/// Uses the OpenAPI subset understood by the Gemini `responseSchema`
/// generation option.
pub fn output_schema() -> Value {
    let labels: Vec<&str> = StatusLabel::ALL.iter().map(|l| l.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            FIELD_CLEANLINESS_SCORE: {
                "type": "NUMBER",
                "description": "Score 0-1 (1 is cleanest)",
            },
            FIELD_STATUS_LABEL: {
                "type": "STRING",
                "enum": labels,
                "description": "Safe, Moderate, or Unsafe",
            },
            FIELD_ESTIMATED_PH: {
                "type": "NUMBER",
                "description": "Estimated pH (0-14)",
            },
            FIELD_ESTIMATED_TURBIDITY: {
                "type": "NUMBER",
                "description": "Estimated turbidity in NTU",
            },
        },
        "required": [
            FIELD_CLEANLINESS_SCORE,
            FIELD_STATUS_LABEL,
            FIELD_ESTIMATED_PH,
            FIELD_ESTIMATED_TURBIDITY,
        ],
    })
}

/// Build the instruction text for a trend digest of recent reports.
pub fn build_digest_prompt(request: &DigestRequest) -> String {
    let mut prompt = String::from(
        "You are an AI assistant helping municipal staff in Indore follow water quality \
         complaints.\n\
         Summarize the recent citizen reports below in a few sentences. Point out emerging \
         trends: wards with repeated or worsening reports, recurring symptoms such as color, \
         smell or sediment, and the overall community sentiment.\n\
         \n",
    );
    for (i, entry) in request.entries().iter().enumerate() {
        let assessment = match (entry.status_label, entry.cleanliness_score) {
            (Some(label), Some(score)) => format!("{label} (score {score:.2})"),
            _ => "not assessed".to_string(),
        };
        prompt.push_str(&format!(
            "Report {n}\nWard: \"{ward}\"\nSubmitted: {at}\nAssessment: {assessment}\nDescription: \"{description}\"\n\n",
            n = i + 1,
            ward = escape(&entry.ward),
            at = entry.submitted_at.format("%Y-%m-%d %H:%M UTC"),
            description = escape(entry.description.as_deref().unwrap_or("")),
        ));
    }
    prompt.push_str("Respond with a single JSON object matching the declared schema and nothing else.");
    prompt
}

/// The response schema declared for trend digests.
pub fn digest_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            FIELD_SUMMARY: {
                "type": "STRING",
                "description": "A summary of the recent citizen reports",
            },
        },
        "required": [FIELD_SUMMARY],
    })
}

/// Escape a value for embedding inside a double-quoted prompt field.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
