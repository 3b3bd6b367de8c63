// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Login-identifier validation and normalization.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
// The only shapes the prefix rules below can produce
static KENYA_MOBILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+254[17]\d{8}$").unwrap());
// General E.164 shape, required of client-supplied phones at registration
static E164_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{7,14}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid phone number format")]
    InvalidPhoneFormat,

    #[error("Invalid phone number")]
    InvalidPhone,
}

/// A login identifier resolved to its canonical lookup form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Email(String),
    Phone(String),
}

/// Validate an email address
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Validate a client-supplied phone number (registration path, E.164)
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Canonicalize a phone number to E.164.
///
/// Strips every non-digit character, then applies the prefix rules in
/// order: a leading `254` country code is dropped, a leading `0` or `7`
/// resolves to `+254...`, a remaining leading `254` gains a `+`. Anything
/// else is rejected.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if let Some(rest) = digits.strip_prefix("254") {
        digits = rest.to_string();
    }

    let candidate = if let Some(rest) = digits.strip_prefix('0') {
        format!("+254{rest}")
    } else if digits.starts_with('7') {
        format!("+254{digits}")
    } else if digits.starts_with("254") {
        format!("+{digits}")
    } else {
        return Err(ValidationError::InvalidPhoneFormat);
    };

    if !KENYA_MOBILE_REGEX.is_match(&candidate) {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(candidate)
}

/// Resolve a raw login identifier to an email or an E.164 phone.
///
/// Email syntax is tried first; on a match the identifier is used
/// verbatim. Everything else is treated as a phone number.
pub fn normalize_identifier(raw: &str) -> Result<Identifier, ValidationError> {
    if is_valid_email(raw) {
        return Ok(Identifier::Email(raw.to_string()));
    }
    normalize_phone(raw).map(Identifier::Phone)
}
