//! User domain
//!
//! This module provides domain types and traits for user accounts,
//! including the user entity, its public projection, validation, and the
//! repository trait.

mod entity;
mod repository;
mod response;
mod validation;

pub use entity::{NewUser, User, UserId, INITIAL_VERSION};
pub use repository::UserRepository;
pub use response::UserResponse;
pub use validation::{
    validate_login, validate_password, validate_password_change, UserValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
