//! Session manager: login, refresh, logout, and password change over a
//! single identity's session lifecycle.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{SanitizedUser, User};
use crate::services::error::{AuthError, StoreError};
use crate::services::identity::IdentityResolver;
use crate::services::jwt::{SessionPair, TokenCodec};
use crate::services::store::{AuthStore, WelcomeNotifier};
use crate::utils::{normalize_email, CredentialHasher};

/// Successful login payload handed to the boundary layer.
#[derive(Debug)]
pub struct Session {
    pub user: SanitizedUser,
    pub pair: SessionPair,
    pub is_first_login: bool,
}

/// Stateless orchestrator over the injected collaborators. Safe for
/// concurrent invocation; all shared mutable state lives in the store.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn AuthStore>,
    resolver: IdentityResolver,
    hasher: CredentialHasher,
    codec: TokenCodec,
    notifier: Arc<dyn WelcomeNotifier>,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn AuthStore>,
        hasher: CredentialHasher,
        codec: TokenCodec,
        notifier: Arc<dyn WelcomeNotifier>,
    ) -> Self {
        let resolver = IdentityResolver::new(store.clone(), hasher.clone());
        Self {
            store,
            resolver,
            hasher,
            codec,
            notifier,
        }
    }

    /// The resolver behind this service, for the boundary layer's
    /// federated callback path.
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Register a new local identity.
    ///
    /// The welcome notification is fire-and-forget: its failure is logged
    /// and never fails the registration.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SanitizedUser, AuthError> {
        let email = normalize_email(email);

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hasher.hash(password)?;
        let user = User::new_local(name.trim().to_string(), email, password_hash);

        // Two concurrent registrations can pass the read above; the email
        // unique constraint decides, and the loser gets the same error.
        self.store.create_user(&user).await.map_err(|e| {
            if e.is_conflict() {
                AuthError::EmailTaken
            } else {
                AuthError::Repository(e)
            }
        })?;

        tracing::info!(user_id = %user.user_id, "User registered");

        let notifier = self.notifier.clone();
        let (to, name) = (user.email.clone(), user.name.clone());
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_welcome(&to, &name).await {
                tracing::warn!(error = %e, "Welcome notification failed");
            }
        });

        Ok(user.sanitized())
    }

    /// Local password login.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = self.resolver.resolve_local(email, password).await?;
        let pair = self.issue_session(&user).await?;

        Ok(Session {
            is_first_login: user.is_first_login,
            user: user.sanitized(),
            pair,
        })
    }

    /// Rotate a refresh token into a fresh session pair.
    ///
    /// Single-use semantics: the presented record is always deleted before
    /// the new pair is issued, so an old refresh token can never be
    /// replayed.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<SessionPair, AuthError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let record = self
            .store
            .find_refresh_token(token)
            .await?
            .ok_or(AuthError::TokenInvalidOrExpired)?;

        // Stored expiry is authoritative even when the record outlived it.
        if record.is_expired() {
            self.store.delete_refresh_token(token).await?;
            return Err(AuthError::TokenInvalidOrExpired);
        }

        // A record whose envelope no longer verifies must not be honored
        // again; delete it on the way out.
        if self.codec.verify_refresh(token).is_err() {
            self.store.delete_refresh_token(token).await?;
            return Err(AuthError::TokenInvalidOrExpired);
        }

        if !record.user_active {
            return Err(AuthError::AccountDeactivated);
        }

        self.store.delete_refresh_token(token).await?;

        let user = self
            .store
            .find_user_by_id(record.user_id)
            .await?
            .ok_or(AuthError::TokenInvalidOrExpired)?;

        let pair = self.issue_session(&user).await?;
        tracing::info!(user_id = %user.user_id, "Session refreshed");
        Ok(pair)
    }

    /// Delete the presented refresh token. Idempotent; an absent token is
    /// not an error.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        if let Some(token) = refresh_token.filter(|t| !t.is_empty()) {
            self.store.delete_refresh_token(token).await?;
        }
        Ok(())
    }

    /// Change a password and revoke every outstanding refresh token for
    /// the identity, forcing re-authentication on all active sessions.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = match user.password_hash.as_deref() {
            Some(hash) => hash,
            None => return Err(AuthError::WrongProvider(user.provider)),
        };

        if !self.hasher.verify(current_password, hash)? {
            return Err(AuthError::WrongCurrentPassword);
        }

        // Compared via the hasher, not plaintext equality.
        if self.hasher.verify(new_password, hash)? {
            return Err(AuthError::PasswordUnchanged);
        }

        let new_hash = self.hasher.hash(new_password)?;
        self.store
            .update_password_revoking_sessions(user.user_id, &new_hash)
            .await?;

        tracing::info!(user_id = %user.user_id, "Password changed, all sessions revoked");
        Ok(())
    }

    /// Issue a session for an identity the resolver already authenticated
    /// against its provider. No password checks here.
    pub async fn federated_login(&self, user: &User) -> Result<Session, AuthError> {
        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let pair = self.issue_session(user).await?;
        Ok(Session {
            user: user.sanitized(),
            pair,
            is_first_login: false,
        })
    }

    async fn issue_session(&self, user: &User) -> Result<SessionPair, AuthError> {
        let access_token = self
            .codec
            .issue_access(user.user_id, user.role)
            .map_err(signing_fault)?;
        let refresh_token = self
            .codec
            .issue_refresh(user.user_id, user.role)
            .map_err(signing_fault)?;

        self.store
            .save_refresh_token(user.user_id, &refresh_token, self.codec.refresh_expiry())
            .await?;

        Ok(SessionPair {
            access_token,
            refresh_token,
        })
    }
}

/// Token signing is CPU-bound and effectively infallible with HS256; a
/// failure is an opaque server fault, same category as a store fault.
fn signing_fault(e: anyhow::Error) -> AuthError {
    AuthError::Repository(StoreError::Other(e))
}
