//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! redb stores raw bytes, so length limits are enforced here rather than
//! by the storage layer.

use crate::utils::AppError;

// ========== Text length limits ==========

/// Names and codes: coupon code, product display name
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons (cancel reason, replacement description, admin notes)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: tracking id, size labels
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ========== Validation helpers ==========

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}
