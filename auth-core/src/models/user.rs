//! User model - canonical identity records across login providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role attached to a verified identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum Role {
    Student,
    Admin,
    SubAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::SubAdmin => "sub-admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            "sub-admin" => Ok(Role::SubAdmin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login provider that created (or owns the password of) an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Provider {
    Local,
    Google,
    Github,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::Google => "google",
            Provider::Github => "github",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Provider::Local),
            "google" => Ok(Provider::Google),
            "github" => Ok(Provider::Github),
            _ => Err(format!("Invalid provider: {}", s)),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity. `password_hash` is `None` for identities created by a
/// federated provider; password login is refused for those.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub provider: Provider,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_first_login: bool,
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Create a new local (password) user. Email must already be normalized.
    pub fn new_local(name: String, email: String, password_hash: String) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            name,
            email,
            password_hash: Some(password_hash),
            role: Role::Student,
            provider: Provider::Local,
            is_active: true,
            is_verified: false,
            is_first_login: true,
            created_utc: Utc::now(),
        }
    }

    /// Create a new federated user. The provider already verified the email
    /// out-of-band, so the account starts verified and past first login.
    pub fn new_federated(name: String, email: String, provider: Provider) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            name,
            email,
            password_hash: None,
            role: Role::Student,
            provider,
            is_active: true,
            is_verified: true,
            is_first_login: false,
            created_utc: Utc::now(),
        }
    }

    /// Whether this identity can log in with a password.
    pub fn has_password(&self) -> bool {
        self.provider == Provider::Local && self.password_hash.is_some()
    }

    /// Convert to sanitized response (no credential material).
    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser::from(self.clone())
    }
}

/// User payload safe to hand to the boundary layer.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub provider: Provider,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for SanitizedUser {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            name: u.name,
            email: u.email,
            role: u.role,
            provider: u.provider,
            is_active: u.is_active,
            is_verified: u.is_verified,
            created_utc: u.created_utc,
        }
    }
}
