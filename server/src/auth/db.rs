use crate::db::DbPool;
use crate::models::{NewSession, NewUser, User};
use crate::schema::{sessions, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;

use super::crypto::{digest_token, SessionToken};

/// How long a bearer token stays valid.
pub const SESSION_TTL: Duration = Duration::days(30);

/// Create a session and return the plaintext token. Only its hash is stored.
pub fn create_session(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<String, diesel::result::Error> {
    let token = SessionToken::issue();
    let expires_at = (Utc::now() + SESSION_TTL).naive_utc();

    let new_session = NewSession {
        user_id,
        token_hash: &token.digest,
        expires_at,
    };

    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    Ok(token.plaintext)
}

pub fn get_user_from_token(pool: &DbPool, token: &str) -> Option<User> {
    let mut conn = pool.get().ok()?;
    let token_hash = digest_token(token);

    sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(&token_hash))
        .filter(sessions::expires_at.gt(Utc::now().naive_utc()))
        .select(User::as_select())
        .first(&mut conn)
        .ok()
}

/// Identity returned by Google's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
}

/// Look the Google account up by subject, then by email (linking the two),
/// and create a password-less user on first sign-in.
pub fn find_or_create_google_user(
    conn: &mut SqliteConnection,
    identity: &GoogleIdentity,
) -> Result<User, diesel::result::Error> {
    conn.transaction(|conn| {
        if let Some(user) = users::table
            .filter(users::google_sub.eq(&identity.sub))
            .select(User::as_select())
            .first(conn)
            .optional()?
        {
            return Ok(user);
        }

        if let Some(user) = users::table
            .filter(users::email.eq(&identity.email))
            .select(User::as_select())
            .first(conn)
            .optional()?
        {
            tracing::info!(user_id = user.id, "linking Google account to existing user");
            return diesel::update(users::table.find(user.id))
                .set(users::google_sub.eq(&identity.sub))
                .returning(User::as_returning())
                .get_result(conn);
        }

        let new_user = NewUser {
            email: &identity.email,
            display_name: identity.name.as_deref(),
            password_hash: None,
            google_sub: Some(&identity.sub),
        };
        let user = diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(conn)?;
        tracing::info!(user_id = user.id, "created user from Google sign-in");
        Ok(user)
    })
}
