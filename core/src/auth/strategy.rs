//! Per-request authentication
//!
//! Resolves a raw `Authorization` header to an authenticated principal.
//! Verification order: token signature and expiry, then subject lookup,
//! then the active flag, then revocation membership. Read-only; nothing
//! here mutates any state.

use campus_auth_shared::models::PublicUser;
use std::sync::Arc;
use tracing::{debug, error};

use crate::auth::revocation::RevocationRegistry;
use crate::auth::token::TokenIssuer;
use crate::error::{AuthError, AuthResult};
use crate::store::CredentialStore;

/// Extract the token from a `Bearer <token>` header value
pub fn extract_bearer(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Authentication pipeline shared by every protected operation
#[derive(Clone)]
pub struct AuthStrategy {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
    registry: RevocationRegistry,
}

impl AuthStrategy {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: TokenIssuer,
        registry: RevocationRegistry,
    ) -> Self {
        Self {
            store,
            issuer,
            registry,
        }
    }

    /// Resolve a required Authorization header to its principal
    pub async fn authenticate(&self, auth_header: &str) -> AuthResult<PublicUser> {
        let token = extract_bearer(auth_header)
            .ok_or_else(|| AuthError::Unauthenticated("token not provided".to_string()))?;
        self.authenticate_token(token).await
    }

    /// Optional authentication: an absent header resolves to no
    /// principal, a present but invalid one still fails
    pub async fn try_authenticate(
        &self,
        auth_header: Option<&str>,
    ) -> AuthResult<Option<PublicUser>> {
        match auth_header {
            None => Ok(None),
            Some(header) => self.authenticate(header).await.map(Some),
        }
    }

    /// Verify a bare token and resolve its subject
    pub async fn authenticate_token(&self, token: &str) -> AuthResult<PublicUser> {
        let claims = self.issuer.verify(token).map_err(|e| {
            debug!(reason = %e, "Rejected session token");
            AuthError::Unauthenticated("token not valid".to_string())
        })?;

        let user = self
            .store
            .find_by_id(claims.id)
            .await
            .map_err(|e| {
                error!(error = ?e, "Credential store failure during authentication");
                AuthError::Internal(anyhow::Error::new(e))
            })?
            .ok_or_else(|| AuthError::Unauthenticated("token not valid".to_string()))?;

        if !user.is_active {
            return Err(AuthError::Unauthenticated(
                "user is not active, talk with an admin".to_string(),
            ));
        }

        if self.registry.is_revoked(token) {
            return Err(AuthError::Unauthenticated(
                "token has been invalidated".to_string(),
            ));
        }

        Ok(user.public_view())
    }
}
