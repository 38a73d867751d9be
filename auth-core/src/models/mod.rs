pub mod oauth_link;
pub mod refresh_token;
pub mod user;

pub use oauth_link::OAuthLink;
pub use refresh_token::RefreshTokenRow;
pub use user::{Provider, Role, SanitizedUser, User};
