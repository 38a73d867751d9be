use thiserror::Error;

use crate::models::Provider;
use crate::utils::HashError;

/// Collaborator-level store fault. Opaque to the core: never interpreted,
/// only surfaced.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Unique-constraint conflict — the one store failure the core
    /// interprets (duplicate email, duplicate OAuth link).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::Database(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    }
}

/// Closed set of failures the session operations can return.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password share this variant so the error
    /// shape cannot be used for account enumeration.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Please login with {0}")]
    WrongProvider(Provider),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Refresh token required")]
    MissingToken,

    #[error("Invalid or expired refresh token")]
    TokenInvalidOrExpired,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("New password must be different from current password")]
    PasswordUnchanged,

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error(transparent)]
    Repository(#[from] StoreError),
}

/// Semantic category the boundary layer maps to a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    Conflict,
    Token,
    Repository,
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::WrongCurrentPassword => {
                ErrorKind::Authentication
            }
            AuthError::AccountDeactivated | AuthError::WrongProvider(_) => ErrorKind::Authorization,
            AuthError::EmailTaken | AuthError::PasswordUnchanged => ErrorKind::Conflict,
            AuthError::MissingToken | AuthError::TokenInvalidOrExpired => ErrorKind::Token,
            AuthError::Hashing(_) | AuthError::Repository(_) => ErrorKind::Repository,
        }
    }
}
