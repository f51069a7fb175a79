//! Registration input rules for the identity surface.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 100;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 100;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").expect("valid regex"));

/// Display names: 2-50 characters, ASCII letters and spaces only.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Name must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"
        )));
    }
    if !NAME_RE.is_match(trimmed) {
        return Err(CoreError::Validation(
            "Name can only contain letters and spaces".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.len() > EMAIL_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Email must be at most {EMAIL_MAX_LEN} characters"
        )));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation("Invalid email address".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters long"
        )));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at most {PASSWORD_MAX_LEN} characters long"
        )));
    }
    Ok(())
}

/// Lower-case and trim an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
