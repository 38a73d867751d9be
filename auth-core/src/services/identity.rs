//! Identity resolver: turns a presented credential into a canonical user.

use std::sync::Arc;

use crate::models::{Provider, User};
use crate::services::error::AuthError;
use crate::services::store::AuthStore;
use crate::utils::{normalize_email, CredentialHasher};

#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn AuthStore>,
    hasher: CredentialHasher,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn AuthStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    /// Resolve a local (email + password) credential.
    ///
    /// Unknown email and wrong password both come back as
    /// `InvalidCredentials`; only the active/provider checks are allowed
    /// to say more.
    pub async fn resolve_local(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let hash = match user.password_hash.as_deref() {
            Some(hash) if user.provider == Provider::Local => hash,
            _ => return Err(AuthError::WrongProvider(user.provider)),
        };

        if !self.hasher.verify(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Resolve a federated assertion into a canonical user, creating the
    /// identity and link on first contact.
    ///
    /// Fast path: the link already exists and no write happens. Otherwise
    /// the store runs the adopt-or-create transaction; an account with a
    /// matching email adopts the new provider link (email is the
    /// cross-provider identity key).
    pub async fn resolve_federated(
        &self,
        provider: Provider,
        external_id: &str,
        name: &str,
        email: &str,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email);

        if let Some(user) = self.store.find_linked_user(provider, external_id).await? {
            return Ok(user);
        }

        let user = self
            .store
            .adopt_or_create_federated(provider, external_id, name, &email)
            .await?;

        tracing::info!(user_id = %user.user_id, provider = %provider, "Federated identity resolved");
        Ok(user)
    }
}
