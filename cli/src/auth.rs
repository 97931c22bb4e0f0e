//! Sign-in commands. The session is kept in the `auth` store so later
//! invocations send its bearer token.

use anyhow::{bail, Context, Result};
use pantry_core::oauth::new_state;
use pantry_core::storage::AUTH_KEY;
use pantry_core::types::{LoginRequest, SignupRequest};
use pantry_core::{
    extract_code, message, AuthStore, GoogleOAuthConfig, LanguageStore, MessageKey, RecipeApi,
    Storage, StorageExt,
};
use serde::{Deserialize, Serialize};
use std::io::Write;

const PENDING_OAUTH_KEY: &str = "oauth_pending";

/// A consent URL handed out but not yet completed.
#[derive(Debug, Serialize, Deserialize)]
struct PendingOAuth {
    state: String,
    redirect_uri: String,
}

fn remember(storage: &dyn Storage, out: &mut dyn Write, session: pantry_core::AuthSession) -> Result<()> {
    let mut auth = AuthStore::load(storage);
    writeln!(out, "Signed in as {}", session.user.email)?;
    auth.set_session(session);
    auth.save(storage)?;
    Ok(())
}

pub async fn signup(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    email: String,
    password: String,
    display_name: Option<String>,
) -> Result<()> {
    let session = api
        .signup(&SignupRequest {
            email,
            password,
            display_name,
        })
        .await?;
    remember(storage, out, session)
}

pub async fn login(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    email: String,
    password: String,
) -> Result<()> {
    let session = api.login(&LoginRequest { email, password }).await?;
    remember(storage, out, session)
}

/// Print the consent URL and remember the state it was issued with.
pub fn google_url(storage: &dyn Storage, out: &mut dyn Write, config: &GoogleOAuthConfig) -> Result<()> {
    let state = new_state();
    let url = config.authorization_url(&state)?;
    storage.save(
        PENDING_OAUTH_KEY,
        &PendingOAuth {
            state,
            redirect_uri: config.redirect_uri.clone(),
        },
    )?;
    writeln!(out, "Open this URL, sign in, then run `pantry google --redirect-url <URL>`:")?;
    writeln!(out, "{}", url)?;
    Ok(())
}

/// Finish Google sign-in from either the pasted redirect URL or a bare code.
pub async fn google(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    code: Option<String>,
    redirect_url: Option<String>,
) -> Result<()> {
    let pending: Option<PendingOAuth> = storage.load(PENDING_OAUTH_KEY);

    let code = match (code, redirect_url) {
        (Some(code), _) => code,
        (None, Some(url)) => {
            let expected = pending.as_ref().map(|p| p.state.as_str());
            extract_code(&url, expected).context("Could not read the redirect URL")?
        }
        (None, None) => bail!("Pass --code or --redirect-url"),
    };

    let redirect_uri = pending.as_ref().map(|p| p.redirect_uri.as_str());
    let session = api.google_login(&code, redirect_uri).await?;
    storage.remove(PENDING_OAUTH_KEY)?;
    remember(storage, out, session)
}

pub fn logout(storage: &dyn Storage, out: &mut dyn Write) -> Result<()> {
    let mut auth = AuthStore::load(storage);
    auth.clear();
    auth.save(storage)?;
    writeln!(out, "Signed out")?;
    Ok(())
}

pub async fn me(api: &dyn RecipeApi, storage: &dyn Storage, out: &mut dyn Write) -> Result<()> {
    let auth = AuthStore::load(storage);
    if !auth.is_authenticated() {
        let locale = LanguageStore::load(storage).locale;
        bail!("{}", message(locale, MessageKey::LoginRequired));
    }
    let profile = api.me().await?;
    match &profile.display_name {
        Some(name) => writeln!(out, "{} <{}> (#{})", name, profile.email, profile.id)?,
        None => writeln!(out, "{} (#{})", profile.email, profile.id)?,
    }
    Ok(())
}

/// Drop a session the server no longer accepts.
pub fn forget_session(storage: &dyn Storage) -> Result<()> {
    if storage.read(AUTH_KEY).is_some() {
        let mut auth = AuthStore::load(storage);
        auth.clear();
        auth.save(storage)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{MemoryStorage, MockApi, OAuthError};

    #[tokio::test]
    async fn test_login_persists_session() {
        let api = MockApi::new();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();

        login(&api, &storage, &mut out, "cook@example.com".into(), "pw".into())
            .await
            .unwrap();
        let auth = AuthStore::load(&storage);
        assert_eq!(auth.token(), Some("mock-token-cook@example.com"));

        logout(&storage, &mut out).unwrap();
        assert!(!AuthStore::load(&storage).is_authenticated());
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let api = MockApi::new();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();
        assert!(me(&api, &storage, &mut out).await.is_err());
        assert_eq!(api.call_count("me"), 0);
    }

    #[tokio::test]
    async fn test_google_redirect_checks_state() {
        let api = MockApi::new();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();
        let config = GoogleOAuthConfig::new("client", "http://localhost/callback");

        google_url(&storage, &mut out, &config).unwrap();
        let pending: PendingOAuth = storage.load(PENDING_OAUTH_KEY).unwrap();

        let forged = "http://localhost/callback?code=abc&state=forged".to_string();
        let err = google(&api, &storage, &mut out, None, Some(forged))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<OAuthError>(),
            Some(&OAuthError::StateMismatch)
        );

        let url = format!("http://localhost/callback?code=chef&state={}", pending.state);
        google(&api, &storage, &mut out, None, Some(url))
            .await
            .unwrap();
        assert_eq!(
            AuthStore::load(&storage).user().map(|u| u.email.as_str()),
            Some("chef@gmail.com")
        );
        assert!(storage.read(PENDING_OAUTH_KEY).is_none());
    }
}
