//! Role authorization
//!
//! Pure set-intersection check over an already-authenticated principal,
//! plus the declarative policy map routing layers consult to find out
//! which roles an operation demands.

use campus_auth_shared::models::{PublicUser, Role};
use std::collections::HashMap;

use crate::error::{AuthError, AuthResult};

/// Authorize a principal against a set of required roles
///
/// An empty requirement allows the request before the principal is even
/// looked at, so unrestricted operations work without authentication.
/// A non-empty requirement with no principal is a wiring error: the
/// guard ran on a route that never authenticated.
pub fn authorize(principal: Option<&PublicUser>, required: &[Role]) -> AuthResult<()> {
    if required.is_empty() {
        return Ok(());
    }

    let user =
        principal.ok_or_else(|| AuthError::BadRequest("user not found in request".to_string()))?;

    if user.has_any_role(required) {
        return Ok(());
    }

    let wanted: Vec<&str> = required.iter().map(|r| r.as_str()).collect();
    Err(AuthError::Forbidden(format!(
        "user {} needs a valid role: [{}]",
        user.email,
        wanted.join(", ")
    )))
}

/// Map from operation name to the roles allowed to call it
///
/// Operations without an entry are unrestricted. Built once at startup
/// next to the route table.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: HashMap<String, Vec<Role>>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require one of `roles` for `operation`, replacing any earlier
    /// rule for it
    pub fn require(mut self, operation: &str, roles: &[Role]) -> Self {
        self.rules.insert(operation.to_string(), roles.to_vec());
        self
    }

    /// Roles required for an operation; empty when unrestricted
    pub fn required_roles(&self, operation: &str) -> &[Role] {
        self.rules
            .get(operation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Authorize a principal for a named operation
    pub fn authorize(&self, principal: Option<&PublicUser>, operation: &str) -> AuthResult<()> {
        authorize(principal, self.required_roles(operation))
    }
}
