//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID '{0}' is not a valid UUID")]
    InvalidId(String),

    #[error("Login cannot be empty")]
    EmptyLogin,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Old password cannot be empty")]
    EmptyOldPassword,

    #[error("New password cannot be empty")]
    EmptyNewPassword,
}

/// Validate a login. Must be non-empty.
pub fn validate_login(login: &str) -> Result<(), UserValidationError> {
    if login.is_empty() {
        return Err(UserValidationError::EmptyLogin);
    }

    Ok(())
}

/// Validate a password supplied at account creation
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    Ok(())
}

/// Validate both halves of a password rotation
pub fn validate_password_change(old: &str, new: &str) -> Result<(), UserValidationError> {
    if old.is_empty() {
        return Err(UserValidationError::EmptyOldPassword);
    }

    if new.is_empty() {
        return Err(UserValidationError::EmptyNewPassword);
    }

    Ok(())
}
