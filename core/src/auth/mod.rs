//! Authentication building blocks
//!
//! HS256 session tokens, bcrypt password hashing, the in-process
//! revocation registry, the per-request authentication strategy, and
//! role authorization.

mod guard;
mod password;
mod revocation;
mod strategy;
mod token;

pub use guard::{authorize, AccessPolicy};
pub use password::PasswordService;
pub use revocation::RevocationRegistry;
pub use strategy::{extract_bearer, AuthStrategy};
pub use token::{Claims, JwtKeys, TokenError, TokenIssuer};
