//! Data models for the Campus platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access roles recognized by the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Teacher,
    SuperUser,
    Student,
}

impl Role {
    /// All roles, in a stable order
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::SuperUser, Role::Student];

    /// Serialized tag for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::SuperUser => "superUser",
            Role::Student => "student",
        }
    }

    /// Parse a role tag, case-insensitively
    pub fn parse(s: &str) -> Result<Role, String> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "superuser" => Ok(Role::SuperUser),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s)
    }
}

/// User account as held by the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub is_active: bool,
    pub roles: Vec<Role>,
}

impl User {
    /// Projection handed to callers. Structurally incapable of leaking
    /// the password hash.
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            is_active: self.is_active,
            roles: self.roles.clone(),
        }
    }
}

/// Authenticated principal as exposed outside the credential store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub roles: Vec<Role>,
}

impl PublicUser {
    /// True when this principal holds at least one of `required`
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        self.roles.iter().any(|role| required.contains(role))
    }
}
