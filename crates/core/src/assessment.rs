//! Assessment request and result types, and the response validator.
//!
//! A backend's raw answer only becomes an [`AssessmentResult`] by passing
//! [`parse_model_output`] or [`validate_value`]. Every violation is reported;
//! nothing is clamped, rounded into range, or defaulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding::PhotoPayload;
use crate::error::AssessmentError;
use crate::status::StatusLabel;
use crate::threshold_validation::{validate_ph, validate_turbidity, validate_unit_range};
use crate::ward::canonical_ward;

pub const FIELD_CLEANLINESS_SCORE: &str = "cleanlinessScore";
pub const FIELD_STATUS_LABEL: &str = "statusLabel";
pub const FIELD_ESTIMATED_PH: &str = "estimatedPH";
pub const FIELD_ESTIMATED_TURBIDITY: &str = "estimatedTurbidity";

/// Maximum length of a citizen description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated request: encoded photo, canonical ward, bounded description.
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    photo: PhotoPayload,
    ward: &'static str,
    description: Option<String>,
}

impl AssessmentRequest {
    /// Validate the ward and description and bundle them with the photo.
    ///
    /// Blank descriptions are dropped. Descriptions are trimmed.
    pub fn new(
        photo: PhotoPayload,
        ward: &str,
        description: Option<&str>,
    ) -> Result<Self, AssessmentError> {
        let ward = canonical_ward(ward).ok_or_else(|| {
            AssessmentError::InvalidRequest(format!("'{}' is not a known ward", ward.trim()))
        })?;

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if let Some(text) = &description {
            let chars = text.chars().count();
            if chars > MAX_DESCRIPTION_CHARS {
                return Err(AssessmentError::InvalidRequest(format!(
                    "description is {chars} characters, limit is {MAX_DESCRIPTION_CHARS}"
                )));
            }
        }

        Ok(Self {
            photo,
            ward,
            description,
        })
    }

    pub fn photo(&self) -> &PhotoPayload {
        &self.photo
    }

    pub fn ward(&self) -> &'static str {
        self.ward
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A schema-valid assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    #[serde(rename = "cleanlinessScore")]
    pub cleanliness_score: f64,
    #[serde(rename = "statusLabel")]
    pub status_label: StatusLabel,
    #[serde(rename = "estimatedPH")]
    pub estimated_ph: f64,
    #[serde(rename = "estimatedTurbidity")]
    pub estimated_turbidity: f64,
}

impl AssessmentResult {
    /// Re-check every invariant on an already-typed result.
    pub fn validate(&self) -> Result<(), AssessmentError> {
        let violations = collect_violations(
            Some(self.cleanliness_score),
            Some(self.status_label),
            Some(self.estimated_ph),
            Some(self.estimated_turbidity),
        );
        into_result(violations)
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Parse raw backend text (expected to be one JSON object) into a result.
pub fn parse_model_output(raw: &str) -> Result<AssessmentResult, AssessmentError> {
    let value: Value = serde_json::from_str(raw.trim()).map_err(|e| {
        AssessmentError::SchemaValidation(format!("response is not valid JSON: {e}"))
    })?;
    validate_value(&value)
}

/// Validate an already-parsed JSON value against the result schema.
pub fn validate_value(value: &Value) -> Result<AssessmentResult, AssessmentError> {
    let object = value.as_object().ok_or_else(|| {
        AssessmentError::SchemaValidation("response must be a JSON object".into())
    })?;

    let mut violations = Vec::new();

    let mut number = |field: &str| -> Option<f64> {
        match object.get(field) {
            None | Some(Value::Null) => {
                violations.push(format!("missing required field {field}"));
                None
            }
            Some(v) => {
                let n = v.as_f64();
                if n.is_none() {
                    violations.push(format!("{field} must be a number, got {v}"));
                }
                n
            }
        }
    };
    let score = number(FIELD_CLEANLINESS_SCORE);
    let ph = number(FIELD_ESTIMATED_PH);
    let turbidity = number(FIELD_ESTIMATED_TURBIDITY);

    let label = match object.get(FIELD_STATUS_LABEL) {
        None | Some(Value::Null) => {
            violations.push(format!("missing required field {FIELD_STATUS_LABEL}"));
            None
        }
        Some(Value::String(s)) => {
            let parsed = StatusLabel::parse(s);
            if parsed.is_none() {
                violations.push(format!(
                    "{FIELD_STATUS_LABEL} must be one of Safe, Moderate, Unsafe, got \"{s}\""
                ));
            }
            parsed
        }
        Some(other) => {
            violations.push(format!("{FIELD_STATUS_LABEL} must be a string, got {other}"));
            None
        }
    };

    violations.extend(collect_violations(score, label, ph, turbidity));
    into_result(violations)?;

    // All four are present once there are no violations.
    match (score, label, ph, turbidity) {
        (Some(cleanliness_score), Some(status_label), Some(estimated_ph), Some(estimated_turbidity)) => {
            Ok(AssessmentResult {
                cleanliness_score,
                status_label,
                estimated_ph,
                estimated_turbidity,
            })
        }
        _ => Err(AssessmentError::SchemaValidation(
            "response is missing required fields".into(),
        )),
    }
}

/// Range and consistency checks over whichever fields are present.
fn collect_violations(
    score: Option<f64>,
    label: Option<StatusLabel>,
    ph: Option<f64>,
    turbidity: Option<f64>,
) -> Vec<String> {
    let mut violations = Vec::new();

    let score_ok = match score {
        Some(s) => match validate_unit_range(s, FIELD_CLEANLINESS_SCORE) {
            Ok(()) => true,
            Err(msg) => {
                violations.push(msg);
                false
            }
        },
        None => false,
    };
    if let Some(p) = ph {
        if let Err(msg) = validate_ph(p, FIELD_ESTIMATED_PH) {
            violations.push(msg);
        }
    }
    if let Some(t) = turbidity {
        if let Err(msg) = validate_turbidity(t, FIELD_ESTIMATED_TURBIDITY) {
            violations.push(msg);
        }
    }

    if let (true, Some(s), Some(l)) = (score_ok, score, label) {
        let expected = StatusLabel::from_score(s);
        if expected != l {
            violations.push(format!(
                "{FIELD_STATUS_LABEL} {l} is inconsistent with {FIELD_CLEANLINESS_SCORE} {s} (expected {expected})"
            ));
        }
    }

    violations
}

fn into_result(violations: Vec<String>) -> Result<(), AssessmentError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AssessmentError::SchemaValidation(violations.join("; ")))
    }
}
