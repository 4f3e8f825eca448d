//! Authentication error handling
//!
//! This module provides the unified error taxonomy for the auth core.
//! Every failure is terminal; callers never retry. Internal causes are
//! logged server-side and surface with a generic message.

use campus_auth_shared::types::{ErrorDetail, ErrorResponse};
use thiserror::Error;

/// Error type surfaced by every auth operation
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("An internal error occurred")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::Unauthenticated(_) => "UNAUTHENTICATED",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            AuthError::BadRequest(_) => "BAD_REQUEST",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Serializable error body for embedders. The internal variant is
    /// masked; its cause only reaches the logs.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail::new(self.code(), self.to_string()),
        }
    }
}

/// Result type alias for auth operations
pub type AuthResult<T> = Result<T, AuthError>;
