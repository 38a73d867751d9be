//! Collaborator interfaces consumed by the session core.
//!
//! The relational store and the notification channel are injected behind
//! these traits; the process entry point owns their construction and
//! lifecycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Provider, RefreshTokenRow, User};
use crate::services::error::StoreError;

/// Persistent store for identities, OAuth links, and refresh tokens.
///
/// Single-row operations mirror the store's tables one to one. The two
/// composite operations (`adopt_or_create_federated`,
/// `update_password_revoking_sessions`) exist because their steps must
/// commit or roll back together; implementations run them inside one
/// transaction at read-committed isolation or stronger.
#[async_trait]
pub trait AuthStore: Send + Sync {
    // ==================== User Operations ====================

    /// Find a user by (normalized) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by id.
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a new user row.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    /// Replace the password hash and clear the first-login flag.
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), StoreError>;

    /// Mark the user's email as verified.
    async fn set_verified(&self, user_id: Uuid) -> Result<(), StoreError>;

    /// Replace the password hash and delete every refresh token for the
    /// user, atomically. Used by password change to force re-auth on all
    /// active sessions.
    async fn update_password_revoking_sessions(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    // ==================== OAuth Link Operations ====================

    /// Find the user already linked to `(provider, external_id)`.
    async fn find_linked_user(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Bind an external subject to an existing user.
    async fn create_link(
        &self,
        user_id: Uuid,
        provider: Provider,
        external_id: &str,
    ) -> Result<(), StoreError>;

    /// Atomic federated find-or-create: adopt the user owning `email` if
    /// one exists, otherwise create a federated user, then insert the
    /// OAuth link — all in one transaction. A unique violation on
    /// `(provider, external_id)` means a concurrent login won the race;
    /// implementations resolve it by re-reading the link once and
    /// returning the winner's user.
    async fn adopt_or_create_federated(
        &self,
        provider: Provider,
        external_id: &str,
        name: &str,
        email: &str,
    ) -> Result<User, StoreError>;

    // ==================== Refresh Token Operations ====================

    /// Persist an issued refresh token.
    async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Look up a refresh token joined with the owning account's state.
    /// Returns the row even when past its stored expiry; the caller owns
    /// the expiry decision and the cleanup.
    async fn find_refresh_token(&self, token: &str)
        -> Result<Option<RefreshTokenRow>, StoreError>;

    /// Delete one refresh token. Deleting an absent token is a no-op.
    async fn delete_refresh_token(&self, token: &str) -> Result<(), StoreError>;

    /// Delete every refresh token belonging to the user.
    async fn delete_all_refresh_tokens(&self, user_id: Uuid) -> Result<(), StoreError>;
}

/// Welcome-message channel. Invoked fire-and-forget: the core attempts the
/// enqueue and ignores delivery outcome.
#[async_trait]
pub trait WelcomeNotifier: Send + Sync {
    async fn notify_welcome(&self, email: &str, name: &str) -> Result<(), anyhow::Error>;
}

/// Notifier that drops every message. For embedders that wire a real
/// channel later, and for tests.
pub struct NoopNotifier;

#[async_trait]
impl WelcomeNotifier for NoopNotifier {
    async fn notify_welcome(&self, _email: &str, _name: &str) -> Result<(), anyhow::Error> {
        Ok(())
    }
}
