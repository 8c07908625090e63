//! Input validation for account and credential forms
//!
//! Every check returns the first problem found so it can be shown to the
//! user before the action runs.

use crate::error::ValidationError;
use crate::{USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH, PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH};

/// Check the shape of an email address
///
/// Accepts `local@domain.tld`: one `@`, a non-empty local part and a
/// domain with an inner dot. Whitespace is rejected anywhere.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidEmail);
    };

    if local.is_empty() || domain.is_empty() {
        return Err(ValidationError::InvalidEmail);
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

/// Check username length and charset
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();

    if len < USERNAME_MIN_LENGTH {
        return Err(ValidationError::UsernameTooShort { min: USERNAME_MIN_LENGTH });
    }
    if len > USERNAME_MAX_LENGTH {
        return Err(ValidationError::UsernameTooLong { max: USERNAME_MAX_LENGTH });
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Err(ValidationError::UsernameInvalidChars);
    }

    Ok(())
}

/// Check master password length, charset and strength
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();

    if len < PASSWORD_MIN_LENGTH {
        return Err(ValidationError::PasswordTooShort { min: PASSWORD_MIN_LENGTH });
    }
    if len > PASSWORD_MAX_LENGTH {
        return Err(ValidationError::PasswordTooLong { max: PASSWORD_MAX_LENGTH });
    }
    if !password.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::PasswordInvalidChars);
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) || !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordTooWeak);
    }

    Ok(())
}

/// Check that a website key is usable
pub fn validate_website(website: &str) -> Result<(), ValidationError> {
    if website.trim().is_empty() {
        return Err(ValidationError::EmptyWebsite);
    }
    Ok(())
}
