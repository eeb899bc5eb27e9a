//! Status labels and the fixed mappings that derive them.
//!
//! Two mappings exist: one from an AI cleanliness score, one from physical
//! readings (pH, turbidity). Both are monotonic: a cleaner sample never maps
//! to a less safe label.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum cleanliness score labelled [`StatusLabel::Safe`].
pub const SAFE_MIN_SCORE: f64 = 0.7;

/// Minimum cleanliness score labelled [`StatusLabel::Moderate`].
pub const MODERATE_MIN_SCORE: f64 = 0.4;

/// Lower bound of the acceptable pH band.
pub const PH_SAFE_LOW: f64 = 6.5;
/// Upper bound of the acceptable pH band.
pub const PH_SAFE_HIGH: f64 = 8.5;

/// Turbidity (NTU) at or above which a sample is at best moderate.
pub const TURBIDITY_MODERATE_NTU: f64 = 5.0;
/// Turbidity (NTU) above which a sample is unsafe.
pub const TURBIDITY_UNSAFE_NTU: f64 = 8.0;

/// Categorical water safety classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusLabel {
    Safe,
    Moderate,
    Unsafe,
}

impl StatusLabel {
    /// All labels, safest first.
    pub const ALL: [StatusLabel; 3] = [Self::Safe, Self::Moderate, Self::Unsafe];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Moderate => "Moderate",
            Self::Unsafe => "Unsafe",
        }
    }

    /// Strict parse: only the exact enumerated spellings are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == value)
    }

    /// Derive the label for a cleanliness score in `[0, 1]`.
    pub fn from_score(score: f64) -> Self {
        if score >= SAFE_MIN_SCORE {
            Self::Safe
        } else if score >= MODERATE_MIN_SCORE {
            Self::Moderate
        } else {
            Self::Unsafe
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify physical readings.
///
/// pH outside `[6.5, 8.5]` or turbidity above 8 NTU is unsafe; turbidity at
/// or above 5 NTU is moderate; anything else is safe.
pub fn classify_readings(ph: f64, turbidity: f64) -> StatusLabel {
    if !(PH_SAFE_LOW..=PH_SAFE_HIGH).contains(&ph) || turbidity > TURBIDITY_UNSAFE_NTU {
        StatusLabel::Unsafe
    } else if turbidity >= TURBIDITY_MODERATE_NTU {
        StatusLabel::Moderate
    } else {
        StatusLabel::Safe
    }
}
