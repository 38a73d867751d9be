//! Authentication and session-lifecycle core.
//!
//! Issuance, verification, rotation, and revocation of credentials for a
//! multi-provider identity system: local password login plus Google and
//! GitHub OAuth, backed by a relational store. The embedding service owns
//! transport, request validation, rate limiting, and bootstrap; this crate
//! exposes the session operations and the collaborator interfaces they
//! consume.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_core::config::AuthConfig;
//! use auth_core::services::{Database, NoopNotifier, SessionService, TokenCodec};
//! use auth_core::utils::CredentialHasher;
//!
//! # async fn wire() -> anyhow::Result<()> {
//! let config = AuthConfig::from_env()?;
//! let pool = auth_core::db::create_pool(&config.database).await?;
//! auth_core::db::run_migrations(&pool).await?;
//!
//! let sessions = SessionService::new(
//!     Arc::new(Database::new(pool)),
//!     CredentialHasher::new(&config.hasher)?,
//!     TokenCodec::new(&config.jwt),
//!     Arc::new(NoopNotifier),
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use models::{Provider, Role, SanitizedUser, User};
pub use services::{
    AuthError, AuthStore, Database, ErrorKind, IdentityResolver, Session, SessionPair,
    SessionService, TokenCodec, WelcomeNotifier,
};
