//! Google OAuth consent URL and redirect parsing.
//!
//! The user opens the consent URL in a browser, signs in, and pastes the
//! URL Google redirected to. The code in it is exchanged by the server.

use url::Url;

use crate::error::OAuthError;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_SCOPES: &str = "openid email profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub auth_url: String,
}

impl GoogleOAuthConfig {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
        }
    }

    /// Read `GOOGLE_CLIENT_ID` and `GOOGLE_REDIRECT_URI`.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI").ok()?;
        Some(Self::new(client_id, redirect_uri))
    }

    pub fn authorization_url(&self, state: &str) -> Result<Url, OAuthError> {
        let mut url =
            Url::parse(&self.auth_url).map_err(|e| OAuthError::InvalidRedirect(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", GOOGLE_SCOPES)
            .append_pair("access_type", "online")
            .append_pair("prompt", "select_account")
            .append_pair("state", state);
        Ok(url)
    }
}

/// Random anti-forgery token for the `state` parameter.
pub fn new_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Pull the authorization code out of the redirect URL.
///
/// When `expected_state` is given, the redirect must carry the same value.
pub fn extract_code(redirect_url: &str, expected_state: Option<&str>) -> Result<String, OAuthError> {
    let url = Url::parse(redirect_url.trim())
        .map_err(|e| OAuthError::InvalidRedirect(e.to_string()))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(OAuthError::Denied(error));
    }
    if let Some(expected) = expected_state {
        if state.as_deref() != Some(expected) {
            return Err(OAuthError::StateMismatch);
        }
    }
    code.filter(|c| !c.is_empty())
        .ok_or(OAuthError::MissingCode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GoogleOAuthConfig {
        GoogleOAuthConfig::new("client-123", "http://localhost:3000/auth/callback")
    }

    #[test]
    fn test_authorization_url_params() {
        let url = config().authorization_url("xyz").unwrap();
        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "openid email profile".to_string())));
        assert!(pairs.contains(&("state".to_string(), "xyz".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:3000/auth/callback".to_string()
        )));
    }

    #[test]
    fn test_extract_code() {
        let code = extract_code(
            "http://localhost:3000/auth/callback?state=xyz&code=4%2F0Abc",
            Some("xyz"),
        )
        .unwrap();
        assert_eq!(code, "4/0Abc");
    }

    #[test]
    fn test_extract_code_errors() {
        assert_eq!(
            extract_code("http://localhost/cb?error=access_denied", None),
            Err(OAuthError::Denied("access_denied".to_string()))
        );
        assert_eq!(
            extract_code("http://localhost/cb?code=abc&state=other", Some("xyz")),
            Err(OAuthError::StateMismatch)
        );
        assert_eq!(
            extract_code("http://localhost/cb?state=xyz", Some("xyz")),
            Err(OAuthError::MissingCode)
        );
        assert!(matches!(
            extract_code("not a url", None),
            Err(OAuthError::InvalidRedirect(_))
        ));
    }

    #[test]
    fn test_states_are_unique() {
        assert_ne!(new_state(), new_state());
    }
}
