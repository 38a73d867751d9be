//! Refresh token model - stateful half of an issued session pair.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::Role;

/// Stored refresh token joined with the owning account's state, the shape
/// a rotation decision needs in one read.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRow {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub user_active: bool,
    pub role: Role,
}

impl RefreshTokenRow {
    /// Check the stored expiry. The signature envelope carries its own
    /// expiry; this one is authoritative for records that outlive it.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(expires_at: DateTime<Utc>) -> RefreshTokenRow {
        RefreshTokenRow {
            token: "opaque".to_string(),
            user_id: Uuid::new_v4(),
            expires_at,
            user_active: true,
            role: Role::Student,
        }
    }

    #[test]
    fn expiry_is_inclusive_of_the_boundary() {
        assert!(row(Utc::now() - Duration::seconds(1)).is_expired());
        assert!(!row(Utc::now() + Duration::days(7)).is_expired());
    }
}
