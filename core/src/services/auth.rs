//! Authentication service
//!
//! Orchestrates the credential store, token issuer, and revocation
//! registry behind the public auth operations: register, login, logout,
//! session status checks, and CLI token provisioning.
//!
//! # Performance
//!
//! Password hashing and verification run on the blocking thread pool;
//! token operations use pre-computed keys and stay on the async path.

use std::sync::Arc;
use tracing::{error, info};

use campus_auth_shared::models::{PublicUser, Role};
use campus_auth_shared::types::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest};
use campus_auth_shared::validation;

use crate::auth::{extract_bearer, AuthStrategy, PasswordService, RevocationRegistry, TokenIssuer};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::store::{CredentialStore, NewUser, StoreError, UserPatch};

/// Input for CLI token provisioning. `password`, `full_name`, and
/// `roles` only apply when the account does not exist yet.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub roles: Vec<Role>,
}

/// Authentication operations over an injected credential store
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
    registry: RevocationRegistry,
    strategy: AuthStrategy,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: TokenIssuer,
        registry: RevocationRegistry,
    ) -> Self {
        let strategy = AuthStrategy::new(store.clone(), issuer.clone(), registry.clone());
        Self {
            store,
            issuer,
            registry,
            strategy,
        }
    }

    /// Build a service from configuration with a fresh registry
    pub fn from_config(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        let issuer = TokenIssuer::new(&config.secret, config.token_ttl_secs);
        Self::new(store, issuer, RevocationRegistry::new())
    }

    /// The per-request authentication pipeline, for embedding in
    /// middleware
    pub fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    /// The shared revocation registry, for wiring up the sweeper task
    pub fn registry(&self) -> &RevocationRegistry {
        &self.registry
    }

    /// Register a new account
    ///
    /// New accounts start active with the platform's default role and
    /// receive a session token immediately.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthResponse> {
        validation::validate_email(&request.email).map_err(AuthError::Validation)?;
        validation::validate_password(&request.password).map_err(AuthError::Validation)?;
        validation::validate_full_name(&request.full_name).map_err(AuthError::Validation)?;

        let password_hash = PasswordService::hash_async(request.password).await?;

        let user = self
            .store
            .insert(NewUser {
                email: request.email,
                password_hash,
                full_name: request.full_name,
                roles: vec![Role::Teacher],
            })
            .await
            .map_err(Self::store_error)?;

        let token = self.issuer.issue(user.id)?;
        Ok(AuthResponse {
            user: user.public_view(),
            token,
        })
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password both fail with `NotFound`; the
    /// error class deliberately does not reveal which one happened.
    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthResponse> {
        let user = self
            .store
            .find_by_email(&request.email)
            .await
            .map_err(Self::store_error)?
            .ok_or_else(|| {
                AuthError::NotFound(format!("user with email {} not found", request.email))
            })?;

        let valid =
            PasswordService::verify_async(request.password, user.password_hash.clone()).await;
        if !valid {
            return Err(AuthError::NotFound("email or password incorrect".to_string()));
        }

        let token = self.issuer.issue(user.id)?;
        Ok(AuthResponse {
            user: user.public_view(),
            token,
        })
    }

    /// Invalidate the caller's session token
    ///
    /// The token stays revoked until its own expiry, at which point the
    /// registry sweep drops the entry.
    pub async fn logout(&self, auth_header: &str) -> AuthResult<LogoutResponse> {
        let token = extract_bearer(auth_header)
            .ok_or_else(|| AuthError::Unauthenticated("token not provided".to_string()))?;

        let claims = self
            .issuer
            .verify(token)
            .map_err(|_| AuthError::Unauthenticated("token not valid".to_string()))?;

        self.registry.invalidate(token, claims.exp);

        Ok(LogoutResponse {
            message: "session closed successfully".to_string(),
        })
    }

    /// Resolve an Authorization header to its principal
    pub async fn authenticate(&self, auth_header: &str) -> AuthResult<PublicUser> {
        self.strategy.authenticate(auth_header).await
    }

    /// Optional authentication for unrestricted operations
    pub async fn try_authenticate(
        &self,
        auth_header: Option<&str>,
    ) -> AuthResult<Option<PublicUser>> {
        self.strategy.try_authenticate(auth_header).await
    }

    /// Re-authenticate and hand back a fresh session token
    pub async fn check_status(&self, auth_header: &str) -> AuthResult<AuthResponse> {
        let user = self.strategy.authenticate(auth_header).await?;
        let token = self.issuer.issue(user.id)?;
        Ok(AuthResponse { user, token })
    }

    /// Mint a long-lived token for tooling, creating the account first
    /// when it does not exist
    pub async fn provision_token(
        &self,
        request: ProvisionRequest,
        ttl_secs: i64,
    ) -> AuthResult<AuthResponse> {
        let existing = self
            .store
            .find_by_email(&request.email)
            .await
            .map_err(Self::store_error)?;

        let user = match existing {
            Some(user) => user,
            None => {
                validation::validate_email(&request.email).map_err(AuthError::Validation)?;
                validation::validate_password(&request.password).map_err(AuthError::Validation)?;
                validation::validate_full_name(&request.full_name)
                    .map_err(AuthError::Validation)?;

                let password_hash = PasswordService::hash_async(request.password).await?;
                let mut user = self
                    .store
                    .insert(NewUser {
                        email: request.email,
                        password_hash,
                        full_name: request.full_name,
                        roles: vec![Role::Teacher],
                    })
                    .await
                    .map_err(Self::store_error)?;

                if !request.roles.is_empty() && user.roles != request.roles {
                    self.store
                        .update(
                            user.id,
                            UserPatch {
                                roles: Some(request.roles.clone()),
                                ..Default::default()
                            },
                        )
                        .await
                        .map_err(Self::store_error)?;
                    user.roles = request.roles;
                }

                info!(user_id = %user.id, "Provisioned new user");
                user
            }
        };

        let token = self.issuer.issue_with_ttl(user.id, ttl_secs)?;
        Ok(AuthResponse {
            user: user.public_view(),
            token,
        })
    }

    // Map store failures onto the public taxonomy. Unexpected causes are
    // logged here and masked outward.
    fn store_error(err: StoreError) -> AuthError {
        match err {
            StoreError::DuplicateEmail(email) => {
                AuthError::DuplicateEmail(format!("email {email} is already registered"))
            }
            StoreError::NotFound(id) => AuthError::NotFound(format!("user with id {id} not found")),
            StoreError::Backend(cause) => {
                error!(error = ?cause, "Credential store failure");
                AuthError::Internal(cause)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialStore;
    use chrono::Utc;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    struct Fixture {
        service: AuthService,
        store: Arc<MemoryCredentialStore>,
        issuer: TokenIssuer,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryCredentialStore::new());
        let issuer = TokenIssuer::new("test-secret", 7_200);
        let service = AuthService::new(store.clone(), issuer.clone(), RevocationRegistry::new());
        Fixture {
            service,
            store,
            issuer,
        }
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: SafeEmail().fake(),
            password: "secret123".to_string(),
            full_name: Name().fake(),
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn test_register_issues_working_session() {
        let f = fixture();
        let response = f.service.register(register_request()).await.unwrap();

        assert!(response.user.is_active);
        assert_eq!(response.user.roles, vec![Role::Teacher]);

        let principal = f
            .service
            .authenticate(&bearer(&response.token))
            .await
            .unwrap();
        assert_eq!(principal.id, response.user.id);
    }

    #[tokio::test]
    async fn test_register_response_carries_no_hash() {
        let f = fixture();
        let response = f.service.register(register_request()).await.unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["user"].get("password_hash").is_none());
        assert!(!json["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let f = fixture();
        let request = register_request();

        f.service.register(request.clone()).await.unwrap();
        let err = f.service.register(request).await.unwrap_err();

        assert!(matches!(err, AuthError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let f = fixture();

        let mut bad_email = register_request();
        bad_email.email = "not-an-email".to_string();
        assert!(matches!(
            f.service.register(bad_email).await.unwrap_err(),
            AuthError::Validation(_)
        ));

        let mut short_password = register_request();
        short_password.password = "nope".to_string();
        assert!(matches!(
            f.service.register(short_password).await.unwrap_err(),
            AuthError::Validation(_)
        ));

        let mut blank_name = register_request();
        blank_name.full_name = "  ".to_string();
        assert!(matches!(
            f.service.register(blank_name).await.unwrap_err(),
            AuthError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let f = fixture();
        let request = register_request();
        f.service.register(request.clone()).await.unwrap();

        let response = f
            .service
            .login(LoginRequest {
                email: request.email,
                password: request.password,
            })
            .await
            .unwrap();

        let principal = f
            .service
            .authenticate(&bearer(&response.token))
            .await
            .unwrap();
        assert_eq!(principal.email, response.user.email);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .login(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            AuthError::NotFound(msg) => assert!(msg.contains("ghost@example.com")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_not_found() {
        let f = fixture();
        let request = register_request();
        f.service.register(request.clone()).await.unwrap();

        let err = f
            .service
            .login(LoginRequest {
                email: request.email,
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();

        // Same class as unknown email; callers cannot tell them apart
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_logout_revokes_the_session() {
        let f = fixture();
        let response = f.service.register(register_request()).await.unwrap();
        let header = bearer(&response.token);

        let confirmation = f.service.logout(&header).await.unwrap();
        assert_eq!(confirmation.message, "session closed successfully");

        let err = f.service.authenticate(&header).await.unwrap_err();
        match err {
            AuthError::Unauthenticated(msg) => assert!(msg.contains("invalidated")),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_logout_requires_a_valid_bearer_token() {
        let f = fixture();

        assert!(matches!(
            f.service.logout("no-scheme-here").await.unwrap_err(),
            AuthError::Unauthenticated(_)
        ));
        assert!(matches!(
            f.service.logout("Bearer garbage").await.unwrap_err(),
            AuthError::Unauthenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_sweep_does_not_resurrect_a_freshly_expired_session() {
        let f = fixture();
        let response = f.service.register(register_request()).await.unwrap();

        // Expired 30 seconds ago; its revocation entry is already sweepable
        let stale = f.issuer.issue_with_ttl(response.user.id, -30).unwrap();
        f.service
            .registry()
            .invalidate(&stale, Utc::now().timestamp() - 30);
        assert_eq!(f.service.registry().sweep(), 1);

        let err = f.service.authenticate(&bearer(&stale)).await.unwrap_err();
        match err {
            AuthError::Unauthenticated(msg) => assert_eq!(msg, "token not valid"),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_status_renews_the_session() {
        let f = fixture();
        let first = f.service.register(register_request()).await.unwrap();

        let renewed = f.service.check_status(&bearer(&first.token)).await.unwrap();
        assert_eq!(renewed.user, first.user);

        let principal = f
            .service
            .authenticate(&bearer(&renewed.token))
            .await
            .unwrap();
        assert_eq!(principal.id, first.user.id);
    }

    #[tokio::test]
    async fn test_check_status_requires_authentication() {
        let f = fixture();
        assert!(f.service.check_status("Bearer junk").await.is_err());
    }

    #[tokio::test]
    async fn test_provision_creates_account_with_requested_roles() {
        let f = fixture();
        let response = f
            .service
            .provision_token(
                ProvisionRequest {
                    email: "ops@example.com".to_string(),
                    password: "secret123".to_string(),
                    full_name: "Ops Account".to_string(),
                    roles: vec![Role::Admin, Role::SuperUser],
                },
                86_400,
            )
            .await
            .unwrap();

        assert_eq!(response.user.roles, vec![Role::Admin, Role::SuperUser]);

        let claims = f.issuer.verify(&response.token).unwrap();
        assert_eq!(claims.exp - claims.iat, 86_400);

        let stored = f
            .store
            .find_by_email("ops@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.roles, vec![Role::Admin, Role::SuperUser]);
    }

    #[tokio::test]
    async fn test_provision_existing_account_only_mints_a_token() {
        let f = fixture();
        let request = register_request();
        let registered = f.service.register(request.clone()).await.unwrap();

        let response = f
            .service
            .provision_token(
                ProvisionRequest {
                    email: request.email.clone(),
                    password: String::new(),
                    full_name: String::new(),
                    roles: vec![Role::Admin],
                },
                86_400,
            )
            .await
            .unwrap();

        // Existing accounts keep their identity and roles
        assert_eq!(response.user.id, registered.user.id);
        assert_eq!(response.user.roles, vec![Role::Teacher]);
    }

    #[tokio::test]
    async fn test_deactivated_account_cannot_authenticate() {
        let f = fixture();
        let response = f.service.register(register_request()).await.unwrap();

        f.store
            .update(
                response.user.id,
                UserPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = f
            .service
            .authenticate(&bearer(&response.token))
            .await
            .unwrap_err();
        match err {
            AuthError::Unauthenticated(msg) => assert!(msg.contains("not active")),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }
}
