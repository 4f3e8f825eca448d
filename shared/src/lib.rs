//! Campus Auth Shared Library
//!
//! This crate contains the principal model, role definitions, and the
//! request/response types shared between the auth core and its embedders.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::{PublicUser, Role, User};
pub use types::*;
