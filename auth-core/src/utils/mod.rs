pub mod password;

pub use password::{CredentialHasher, HashError};

/// Emails are case-insensitive identity keys; every read and write goes
/// through this normalization.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
