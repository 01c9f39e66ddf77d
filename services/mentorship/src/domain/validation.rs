//! Field validation for registration, mentor and program forms.

use crate::error::PortalServiceError;

pub const MIN_ACADEMIC_YEAR: i32 = 1900;
pub const MAX_ACADEMIC_YEAR: i32 = 2100;

pub fn require(field: &'static str, value: &str) -> Result<String, PortalServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortalServiceError::validation(field, "is required"));
    }
    Ok(trimmed.to_owned())
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn email(field: &'static str, value: &str) -> Result<String, PortalServiceError> {
    let value = require(field, value)?.to_lowercase();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(PortalServiceError::validation(field, "not a valid email address"));
    }
    Ok(value)
}

/// Digits only once `+`, `-` and spaces are stripped. The raw input is kept.
pub fn phone(value: &str) -> Result<String, PortalServiceError> {
    let value = require("phone", value)?;
    let digits: String = value
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | ' '))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PortalServiceError::validation("phone", "must contain digits only"));
    }
    Ok(value)
}

pub fn pincode(value: &str) -> Result<String, PortalServiceError> {
    let value = value.trim();
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(PortalServiceError::validation("pincode", "must be exactly 6 digits"));
    }
    Ok(value.to_owned())
}

pub fn academic_year(value: i32) -> Result<i32, PortalServiceError> {
    if !(MIN_ACADEMIC_YEAR..=MAX_ACADEMIC_YEAR).contains(&value) {
        return Err(PortalServiceError::validation(
            "year",
            format!("must be between {MIN_ACADEMIC_YEAR} and {MAX_ACADEMIC_YEAR}"),
        ));
    }
    Ok(value)
}

pub fn percentage(value: f64) -> Result<f64, PortalServiceError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(PortalServiceError::validation("percentage", "must be between 0 and 100"));
    }
    Ok(value)
}

/// Blank optional strings collapse to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Optional link to externally hosted media. Blank collapses to `None`;
/// anything else must be an absolute http(s) URL with a host.
pub fn media_url(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, PortalServiceError> {
    let Some(value) = optional(value) else {
        return Ok(None);
    };
    let host_and_path = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    let valid = match host_and_path {
        Some(rest) => !rest.is_empty() && !rest.starts_with('/'),
        None => false,
    };
    if !valid || value.contains(char::is_whitespace) {
        return Err(PortalServiceError::validation(field, "must be an http(s) URL"));
    }
    Ok(Some(value))
}
