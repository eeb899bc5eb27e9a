//! Shared range-checking helpers for scores and water readings.
//!
//! Each helper returns a human-readable message naming the field, so callers
//! can wrap it in whichever error type their layer uses.

/// Lowest pH value accepted anywhere in the system.
pub const PH_MIN: f64 = 0.0;
/// Highest pH value accepted anywhere in the system.
pub const PH_MAX: f64 = 14.0;

/// Validate that a value is finite and falls within `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!("{name} must be between 0.0 and 1.0, got {value}"));
    }
    Ok(())
}

/// Validate that a pH value is finite and within `[0, 14]`.
pub fn validate_ph(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || !(PH_MIN..=PH_MAX).contains(&value) {
        return Err(format!("{name} must be between 0 and 14, got {value}"));
    }
    Ok(())
}

/// Validate that a turbidity value (NTU) is finite and non-negative.
pub fn validate_turbidity(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{name} must be a non-negative number, got {value}"));
    }
    Ok(())
}
