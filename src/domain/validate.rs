//! Field validation helpers shared by entity `validate` impls

use super::entity::{DomainError, DomainResult};

pub fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    Ok(())
}

/// Required and strictly positive. NaN fails.
pub fn require_positive(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(field, "must be greater than 0"));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(field, "must not be negative"));
    }
    Ok(())
}

/// Draft numeric fields are optional so a missing value reads as a
/// validation failure rather than a decode error.
pub fn required_number(field: &str, value: Option<f64>) -> DomainResult<f64> {
    let value = value.ok_or_else(|| DomainError::validation(field, "is required"))?;
    require_positive(field, value)?;
    Ok(value)
}

/// Trim text input; empty strings become `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
