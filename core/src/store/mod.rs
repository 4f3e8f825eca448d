//! Credential store abstraction
//!
//! The auth core reaches persistence only through [`CredentialStore`].
//! Records returned by a store still carry the password hash; the core
//! applies the public projection before anything leaves it.

use async_trait::async_trait;
use campus_auth_shared::models::{Role, User};
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::{create_pool, run_migrations, DbConfig, PgCredentialStore};

/// Failure surfaced by credential store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Email uniqueness violation on insert
    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    /// Update target does not exist
    #[error("user {0} not found")]
    NotFound(Uuid),

    /// Anything else: connectivity, corrupt rows, backend bugs
    #[error("credential store failure")]
    Backend(#[from] anyhow::Error),
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub roles: Vec<Role>,
}

/// Partial update applied to an existing user. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub roles: Option<Vec<Role>>,
}

/// Persistence contract consumed by the auth core
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Look up a user by email (case-sensitive, no normalization)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. The store enforces email uniqueness and
    /// reports violations as [`StoreError::DuplicateEmail`].
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Apply a partial update to an existing user
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<(), StoreError>;
}
