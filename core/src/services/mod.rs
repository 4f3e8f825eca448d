//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the credential store and the token machinery.

pub mod auth;

pub use auth::{AuthService, ProvisionRequest};
