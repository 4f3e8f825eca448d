//! Session token issuance and verification
//!
//! HS256 tokens with pre-computed keys so no key derivation happens on
//! the per-request path.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub id: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token verification failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

/// Pre-computed signing keys for efficient token operations
/// These are expensive to create, so they are built once and shared
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new keys from the signing secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token issuer and verifier
///
/// Keys are wrapped in Arc for cheap cloning; build one issuer at
/// startup and clone it wherever tokens are handled.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: JwtKeys,
    default_ttl_secs: i64,
}

impl TokenIssuer {
    /// Create a new issuer with pre-computed keys
    pub fn new(secret: &str, default_ttl_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            default_ttl_secs,
        }
    }

    /// Issue a session token with the default lifetime
    #[inline]
    pub fn issue(&self, subject: Uuid) -> Result<String> {
        self.issue_with_ttl(subject, self.default_ttl_secs)
    }

    /// Issue a token with an explicit lifetime (CLI tokens use 24 h)
    pub fn issue_with_ttl(&self, subject: Uuid, ttl_secs: i64) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_secs);

        let claims = Claims {
            id: subject,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))
    }

    /// Verify a token's signature and expiry, returning its claims
    #[inline]
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // Zero leeway: acceptance ends exactly at exp, the same instant
        // revocation entries stop being retained.
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, self.keys.decoding(), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }

    /// Default session token lifetime in seconds
    #[inline]
    pub fn default_ttl_secs(&self) -> i64 {
        self.default_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", 7_200)
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = create_test_issuer();
        let subject = Uuid::new_v4();

        let token = issuer.issue(subject).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.id, subject);
        assert_eq!(claims.exp - claims.iat, 7_200);
    }

    #[test]
    fn test_explicit_ttl_respected() {
        let issuer = create_test_issuer();
        let token = issuer.issue_with_ttl(Uuid::new_v4(), 86_400).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_wrong_secret_rejected_as_invalid_signature() {
        let issuer = create_test_issuer();
        let other = TokenIssuer::new("another-secret", 7_200);

        let token = issuer.issue(Uuid::new_v4()).unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = create_test_issuer();

        let token = issuer.issue_with_ttl(Uuid::new_v4(), -120).unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_no_grace_interval_after_expiry() {
        let issuer = create_test_issuer();

        // 30 seconds past exp, within jsonwebtoken's default 60-second leeway
        let token = issuer.issue_with_ttl(Uuid::new_v4(), -30).unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_rejected_as_malformed() {
        let issuer = create_test_issuer();
        assert_eq!(issuer.verify(""), Err(TokenError::Malformed));
        assert_eq!(issuer.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(issuer.verify("still.not.atoken"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_issuer_is_clone_cheap() {
        let issuer = create_test_issuer();
        let cloned = issuer.clone(); // Should be cheap due to Arc

        let token = issuer.issue(Uuid::new_v4()).unwrap();
        assert!(cloned.verify(&token).is_ok());
    }

    // Property-based tests
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_round_trip_preserves_subject(bytes in any::<[u8; 16]>()) {
            let issuer = create_test_issuer();
            let subject = Uuid::from_bytes(bytes);
            let token = issuer.issue(subject).unwrap();
            prop_assert_eq!(issuer.verify(&token).unwrap().id, subject);
        }

        #[test]
        fn prop_ttl_sets_expiry(ttl in 120i64..2_592_000) {
            let issuer = create_test_issuer();
            let token = issuer.issue_with_ttl(Uuid::new_v4(), ttl).unwrap();
            let claims = issuer.verify(&token).unwrap();
            prop_assert_eq!(claims.exp - claims.iat, ttl);
        }

        #[test]
        fn prop_random_strings_never_verify(token in "[A-Za-z0-9._-]{0,64}") {
            let issuer = create_test_issuer();
            prop_assert!(issuer.verify(&token).is_err());
        }
    }
}
