//! OAuth link model - binds an external provider subject to a user.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::Provider;

/// OAuth link entity. `(provider, external_id)` is unique and a user holds
/// at most one link per provider. Immutable once created.
#[derive(Debug, Clone, FromRow)]
pub struct OAuthLink {
    pub link_id: Uuid,
    pub user_id: Uuid,
    pub provider: Provider,
    pub external_id: String,
    pub created_utc: DateTime<Utc>,
}

impl OAuthLink {
    pub fn new(user_id: Uuid, provider: Provider, external_id: String) -> Self {
        Self {
            link_id: Uuid::new_v4(),
            user_id,
            provider,
            external_id,
            created_utc: Utc::now(),
        }
    }
}
