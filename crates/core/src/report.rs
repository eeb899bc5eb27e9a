//! Citizen report lifecycle rules.
//!
//! A report carries two independent state machines:
//!
//! - the automatic assessment: `Succeeded | Failed`, fixed when the report
//!   is stored;
//! - the human review: `Pending -> Approved | Rejected`, decided once by an
//!   admin.
//!
//! A failed assessment never carries a result. Admins may attach a manual
//! score to such a report instead.

use serde::{Deserialize, Serialize};

use crate::assessment::AssessmentResult;
use crate::error::{AssessmentErrorKind, CoreError};
use crate::status::StatusLabel;
use crate::threshold_validation::{validate_ph, validate_turbidity, validate_unit_range};

/// Outcome of the automatic assessment attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssessmentState {
    Succeeded {
        result: AssessmentResult,
    },
    Failed {
        kind: AssessmentErrorKind,
        message: String,
    },
}

impl AssessmentState {
    pub fn result(&self) -> Option<&AssessmentResult> {
        match self {
            Self::Succeeded { result } => Some(result),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// The coarse status shown to citizens: `"completed"` or `"unavailable"`.
    /// Failure details are for admins only.
    pub fn public_status(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "completed",
            Self::Failed { .. } => "unavailable",
        }
    }
}

/// Human review state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Parse the stored form produced by [`ReviewStatus::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Approved" => Some(Self::Approved),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Only a pending report can be decided, and only to a final state.
    pub fn can_transition_to(self, next: ReviewStatus) -> bool {
        self == Self::Pending && next != Self::Pending
    }
}

/// A score entered by an admin for a report whose assessment failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManualScore {
    pub cleanliness_score: f64,
    pub status_label: StatusLabel,
    pub ph: Option<f64>,
    pub turbidity: Option<f64>,
}

impl ManualScore {
    /// Validate admin input; the label is always derived from the score.
    pub fn new(
        cleanliness_score: f64,
        ph: Option<f64>,
        turbidity: Option<f64>,
    ) -> Result<Self, CoreError> {
        validate_unit_range(cleanliness_score, "cleanliness_score").map_err(CoreError::Validation)?;
        if let Some(p) = ph {
            validate_ph(p, "ph").map_err(CoreError::Validation)?;
        }
        if let Some(t) = turbidity {
            validate_turbidity(t, "turbidity").map_err(CoreError::Validation)?;
        }
        Ok(Self {
            cleanliness_score,
            status_label: StatusLabel::from_score(cleanliness_score),
            ph,
            turbidity,
        })
    }
}

/// The score that counts for a report, if any.
///
/// An automatic result takes precedence; a manual score stands in for a
/// failed assessment.
pub fn effective_score(
    assessment: &AssessmentState,
    manual: Option<&ManualScore>,
) -> Option<EffectiveScore> {
    if let Some(result) = assessment.result() {
        return Some(EffectiveScore {
            cleanliness_score: result.cleanliness_score,
            status_label: result.status_label,
            ph: Some(result.estimated_ph),
            turbidity: Some(result.estimated_turbidity),
        });
    }
    manual.map(|m| EffectiveScore {
        cleanliness_score: m.cleanliness_score,
        status_label: m.status_label,
        ph: m.ph,
        turbidity: m.turbidity,
    })
}

/// Flattened view of whichever score applies to a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveScore {
    pub cleanliness_score: f64,
    pub status_label: StatusLabel,
    pub ph: Option<f64>,
    pub turbidity: Option<f64>,
}
