//! PostgreSQL implementation of the auth store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{OAuthLink, Provider, RefreshTokenRow, User};
use crate::services::error::StoreError;
use crate::services::store::AuthStore;

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// One attempt at the federated find-or-create transaction: adopt by
    /// email or insert a new user, then insert the link. Rolls back as a
    /// unit on any failure (including drop without commit).
    async fn try_adopt_or_create(
        &self,
        provider: Provider,
        external_id: &str,
        name: &str,
        email: &str,
    ) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;

        let user = match existing {
            Some(user) => user,
            None => {
                let user = User::new_federated(name.to_string(), email.to_string(), provider);
                sqlx::query(
                    r#"
                    INSERT INTO users (user_id, name, email, password_hash, role, provider,
                                       is_active, is_verified, is_first_login, created_utc)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    "#,
                )
                .bind(user.user_id)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.role)
                .bind(user.provider)
                .bind(user.is_active)
                .bind(user.is_verified)
                .bind(user.is_first_login)
                .bind(user.created_utc)
                .execute(&mut *tx)
                .await?;
                user
            }
        };

        let link = OAuthLink::new(user.user_id, provider, external_id.to_string());
        sqlx::query(
            r#"
            INSERT INTO oauth_links (link_id, user_id, provider, external_id, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(link.link_id)
        .bind(link.user_id)
        .bind(link.provider)
        .bind(&link.external_id)
        .bind(link.created_utc)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }
}

#[async_trait]
impl AuthStore for Database {
    // ==================== User Operations ====================

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, name, email, password_hash, role, provider,
                               is_active, is_verified, is_first_login, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.provider)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.is_first_login)
        .bind(user.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users SET password_hash = $1, is_first_login = FALSE WHERE user_id = $2",
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_verified(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET is_verified = TRUE WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_password_revoking_sessions(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE users SET password_hash = $1, is_first_login = FALSE WHERE user_id = $2",
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ==================== OAuth Link Operations ====================

    async fn find_linked_user(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM oauth_links ol
            JOIN users u ON u.user_id = ol.user_id
            WHERE ol.provider = $1 AND ol.external_id = $2
            "#,
        )
        .bind(provider)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_link(
        &self,
        user_id: Uuid,
        provider: Provider,
        external_id: &str,
    ) -> Result<(), StoreError> {
        let link = OAuthLink::new(user_id, provider, external_id.to_string());
        sqlx::query(
            r#"
            INSERT INTO oauth_links (link_id, user_id, provider, external_id, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(link.link_id)
        .bind(link.user_id)
        .bind(link.provider)
        .bind(&link.external_id)
        .bind(link.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn adopt_or_create_federated(
        &self,
        provider: Provider,
        external_id: &str,
        name: &str,
        email: &str,
    ) -> Result<User, StoreError> {
        match self
            .try_adopt_or_create(provider, external_id, name, email)
            .await
        {
            Ok(user) => Ok(user),
            Err(e) if e.is_conflict() => {
                // A concurrent first login for the same subject committed
                // between our read and our insert. The constraint rolled us
                // back; the winner's link is now visible.
                tracing::debug!(provider = %provider, "federated link race lost, re-reading");
                self.find_linked_user(provider, external_id).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    // ==================== Refresh Token Operations ====================

    async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRow>, StoreError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT rt.token, rt.user_id, rt.expires_at,
                   u.is_active AS user_active, u.role
            FROM refresh_tokens rt
            JOIN users u ON u.user_id = rt.user_id
            WHERE rt.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all_refresh_tokens(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
