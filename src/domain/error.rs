use thiserror::Error;

use crate::domain::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("A user with this email is already registered")]
    DuplicateEmail,
    // One message for unknown email and wrong password, so callers
    // cannot probe which emails are registered.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Product not found")]
    ProductNotFound,
    #[error("Internal error: {0}")]
    Internal(String),
}
