//! Services layer: error taxonomy, collaborator interfaces, and the
//! session-lifecycle business logic.

mod database;
pub mod error;
mod identity;
mod jwt;
mod session;
mod store;

pub use database::Database;
pub use error::{AuthError, ErrorKind, StoreError};
pub use identity::IdentityResolver;
pub use jwt::{Claims, SessionPair, TokenCodec, TokenError};
pub use session::{Session, SessionService};
pub use store::{AuthStore, NoopNotifier, WelcomeNotifier};
