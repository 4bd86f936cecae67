//! Input validation functions
//!
//! Length limits mirror the database schema: usernames and post titles are
//! bounded so they fit their indexed columns. Lengths count characters, not
//! bytes.

use thiserror::Error;
use validator::ValidateEmail;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 64;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 64;
/// bcrypt input limit; multibyte passwords can reach it below `PASSWORD_MAX_LEN` characters
pub const PASSWORD_MAX_BYTES: usize = 72;
pub const TITLE_MAX_LEN: usize = 255;

/// Validate username length and characters
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(format!(
            "Username must be at least {} characters",
            USERNAME_MIN_LEN
        ));
    }
    if len > USERNAME_MAX_LEN {
        return Err(format!(
            "Username must be at most {} characters",
            USERNAME_MAX_LEN
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err("Username cannot contain whitespace".to_string());
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password length, in characters and in bytes
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }
    if len > PASSWORD_MAX_LEN || password.len() > PASSWORD_MAX_BYTES {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate post title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(format!(
            "Title must be at most {} characters",
            TITLE_MAX_LEN
        ));
    }
    Ok(())
}

/// Validate post or comment body
pub fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Content cannot be empty".to_string());
    }
    Ok(())
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Attach a field name to the result of one of the validators above
    pub fn check(field: &str, result: Result<(), String>) -> Result<(), Self> {
        result.map_err(|message| Self::new(field, &message))
    }
}
