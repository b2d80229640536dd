//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the engine enforces consistent invariants.

use chrono::NaiveDate;

use crate::{EngineError, ResultEngine};

/// Trims a required name-like field and rejects empty input.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field, mapping whitespace-only to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Requires `end` strictly after `start`.
pub(crate) fn validate_date_range(
    start: NaiveDate,
    end: NaiveDate,
    label: &str,
) -> ResultEngine<()> {
    if end <= start {
        return Err(EngineError::InvalidDate(format!(
            "{label}: end date must be after start date"
        )));
    }
    Ok(())
}

/// Requires a whole percent in `0..=100` (alert thresholds, confidence).
pub(crate) fn validate_percent(value: i32, label: &str) -> ResultEngine<i32> {
    if !(0..=100).contains(&value) {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be between 0 and 100"
        )));
    }
    Ok(value)
}

/// Requires a strictly positive amount in minor units.
pub(crate) fn require_positive_amount(minor: i64, label: &str) -> ResultEngine<i64> {
    if minor <= 0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(minor)
}

/// Requires a non-negative amount in minor units.
pub(crate) fn require_non_negative_amount(minor: i64, label: &str) -> ResultEngine<i64> {
    if minor < 0 {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not be negative"
        )));
    }
    Ok(minor)
}
