mod crypto;
mod db;
mod extractor;
pub mod google;
mod middleware;

pub use crypto::{hash_password, verify_password};
pub use db::{create_session, find_or_create_google_user, GoogleIdentity};
pub use extractor::AuthUser;
pub use middleware::require_auth;
