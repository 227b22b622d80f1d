//! # AppError
//!
//! Centralized error handling for the Imager ecosystem.
//! Every failure is a rejected operation; nothing here is fatal to the process.

use thiserror::Error;

/// The primary error type for all imager-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No identity where one is required (anonymous caller on a write path)
    #[error("must log in: {0}")]
    Unauthenticated(String),

    /// Identity present but not allowed to touch the item
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist (e.g., Photo, Album, Profile)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Duplicate provisioning, duplicate username, or album membership violation
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing required field, oversized field, or unknown enum value
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Infrastructure failure (e.g., DB down, bad migration)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        AppError::NotFound(entity.to_string(), id.to_string())
    }
}

/// A specialized Result type for Imager logic.
pub type Result<T> = std::result::Result<T, AppError>;
