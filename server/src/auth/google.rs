//! Google OAuth authorization-code exchange.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::GoogleIdentity;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Error, Debug)]
pub enum GoogleAuthError {
    #[error("Google sign-in is not configured")]
    NotConfigured,

    #[error("Request to Google failed: {0}")]
    RequestFailed(String),

    #[error("Google rejected the authorization code: {0}")]
    Rejected(String),

    #[error("Google account has no verified email")]
    UnverifiedEmail,
}

/// OAuth client settings, read from the environment.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    /// `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and `GOOGLE_REDIRECT_URI`
    /// are required; `GOOGLE_TOKEN_URL` and `GOOGLE_USERINFO_URL` override
    /// Google's endpoints.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI").ok()?;
        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
            token_url: std::env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            userinfo_url: std::env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| DEFAULT_USERINFO_URL.to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

/// Trade an authorization code for the Google account behind it.
///
/// `redirect_uri` must match the one used to obtain the code; the configured
/// URI is used when the client doesn't send one.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &GoogleConfig,
    code: &str,
    redirect_uri: Option<&str>,
) -> Result<GoogleIdentity, GoogleAuthError> {
    let request = TokenRequest {
        code,
        client_id: &config.client_id,
        client_secret: &config.client_secret,
        redirect_uri: redirect_uri.unwrap_or(&config.redirect_uri),
        grant_type: "authorization_code",
    };

    let response = client
        .post(&config.token_url)
        .form(&request)
        .send()
        .await
        .map_err(|e| GoogleAuthError::RequestFailed(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GoogleAuthError::RequestFailed(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<TokenErrorResponse>(&body)
            .map(|e| e.error_description.unwrap_or(e.error))
            .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
        return Err(GoogleAuthError::Rejected(message));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| GoogleAuthError::RequestFailed(format!("bad token response: {}", e)))?;

    let info: UserInfo = client
        .get(&config.userinfo_url)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| GoogleAuthError::RequestFailed(e.to_string()))?
        .json()
        .await
        .map_err(|e| GoogleAuthError::RequestFailed(format!("bad userinfo response: {}", e)))?;

    let email = match (info.email, info.email_verified) {
        (Some(email), Some(true) | None) => email,
        _ => return Err(GoogleAuthError::UnverifiedEmail),
    };

    Ok(GoogleIdentity {
        sub: info.sub,
        email,
        name: info.name,
    })
}
