//! reqwest-backed implementation of [`RecipeApi`].

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::retry::{with_retry, with_timeout, RetryPolicy};
use super::RecipeApi;
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::matching::MatchResult;
use crate::types::{
    AuthSession, GoogleLoginRequest, Ingredient, IngredientCategory, LoginRequest, MatchRequest,
    RecipeDetail, RecipePage, RecipeQuery, RecipeSummary, SignupRequest, TagLists, UserProfile,
};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct IngredientsBody {
    ingredients: Vec<Ingredient>,
}

#[derive(Deserialize)]
struct CategoriesBody {
    categories: Vec<IngredientCategory>,
}

#[derive(Deserialize)]
struct FavoritesBody {
    recipes: Vec<RecipeSummary>,
}

/// Configuration for [`HttpApiClient`].
#[derive(Clone)]
pub struct HttpApiClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: String,
}

impl Default for HttpApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpApiClientBuilder {
    /// Create a builder with default settings.
    ///
    /// Environment variables:
    /// - `PANTRY_API_URL`: server base URL (default `http://localhost:3000`)
    /// - `PANTRY_HTTP_TIMEOUT_MS`: per-attempt timeout (default 10000)
    pub fn new() -> Self {
        let base_url =
            std::env::var("PANTRY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_ms = std::env::var("PANTRY_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10_000);

        Self {
            base_url,
            token: None,
            timeout: Duration::from_millis(timeout_ms),
            retry: RetryPolicy::default(),
            user_agent: format!("pantry/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Bearer token sent with every request.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<HttpApiClient, ApiError> {
        let base_url =
            Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let inner = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .build()?;

        Ok(HttpApiClient {
            inner,
            base_url,
            token: self.token,
            timeout: self.timeout,
            retry: self.retry,
        })
    }
}

pub struct HttpApiClient {
    inner: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpApiClient {
    pub fn builder() -> HttpApiClientBuilder {
        HttpApiClientBuilder::new()
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let mut request = self.inner.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    /// Send with timeout and retry, returning only successful responses.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        with_retry(&self.retry, || {
            let attempt = request.try_clone();
            async move {
                let attempt = attempt.ok_or_else(|| {
                    ApiError::InvalidUrl("request body cannot be replayed".to_string())
                })?;
                with_timeout(self.timeout, async {
                    let response = attempt.send().await.map_err(classify_send_error)?;
                    check_status(response).await
                })
                .await
            }
        })
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?.query(query);
        decode(self.execute(request).await?).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path)?.json(body);
        decode(self.execute(request).await?).await
    }
}

fn classify_send_error(e: reqwest::Error) -> ApiError {
    if e.is_connect() {
        ApiError::ConnectionRefused(e.to_string())
    } else if e.is_timeout() {
        ApiError::Timeout(0)
    } else {
        ApiError::Network(e)
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);

    tracing::debug!(status = status.as_u16(), %message, "api request failed");
    Err(match status {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn locale_query(locale: Locale) -> [(&'static str, String); 1] {
    [("locale", locale.as_str().to_string())]
}

#[async_trait]
impl RecipeApi for HttpApiClient {
    async fn list_recipes(&self, query: &RecipeQuery) -> Result<RecipePage, ApiError> {
        self.get_json("/api/recipes", &query.to_pairs()).await
    }

    async fn get_recipe(&self, id: i32, locale: Locale) -> Result<RecipeDetail, ApiError> {
        self.get_json(&format!("/api/recipes/{}", id), &locale_query(locale))
            .await
    }

    async fn list_ingredients(&self, locale: Locale) -> Result<Vec<Ingredient>, ApiError> {
        let body: IngredientsBody = self
            .get_json("/api/ingredients", &locale_query(locale))
            .await?;
        Ok(body.ingredients)
    }

    async fn grouped_ingredients(
        &self,
        locale: Locale,
    ) -> Result<Vec<IngredientCategory>, ApiError> {
        let body: CategoriesBody = self
            .get_json("/api/ingredients/grouped", &locale_query(locale))
            .await?;
        Ok(body.categories)
    }

    async fn list_tags(&self, locale: Locale) -> Result<TagLists, ApiError> {
        self.get_json("/api/tags", &locale_query(locale)).await
    }

    async fn match_recipe(
        &self,
        id: i32,
        ingredient_ids: &[i32],
    ) -> Result<MatchResult, ApiError> {
        let body = MatchRequest {
            ingredient_ids: ingredient_ids.to_vec(),
        };
        self.post_json(&format!("/api/recipes/{}/match", id), &body)
            .await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthSession, ApiError> {
        self.post_json("/api/auth/signup", request).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        self.post_json("/api/auth/login", request).await
    }

    async fn google_login(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<AuthSession, ApiError> {
        let body = GoogleLoginRequest {
            code: code.to_string(),
            redirect_uri: redirect_uri.map(str::to_string),
        };
        self.post_json("/api/auth/google", &body).await
    }

    async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/api/auth/me", &[]).await
    }

    async fn favorites(&self, locale: Locale) -> Result<Vec<RecipeSummary>, ApiError> {
        let body: FavoritesBody = self
            .get_json("/api/favorites", &locale_query(locale))
            .await?;
        Ok(body.recipes)
    }

    async fn add_favorite(&self, recipe_id: i32) -> Result<(), ApiError> {
        let request = self.request(Method::POST, &format!("/api/favorites/{}", recipe_id))?;
        self.execute(request).await?;
        Ok(())
    }

    async fn remove_favorite(&self, recipe_id: i32) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/api/favorites/{}", recipe_id))?;
        self.execute(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_bad_url() {
        let result = HttpApiClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_paths_join_onto_base() {
        let client = HttpApiClientBuilder::new()
            .base_url("http://example.com:8080/")
            .build()
            .unwrap();
        let request = client
            .request(Method::GET, "/api/recipes/5")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://example.com:8080/api/recipes/5");
    }

    #[test]
    fn test_bearer_header() {
        let client = HttpApiClientBuilder::new()
            .base_url("http://localhost:3000")
            .token(Some("secret".to_string()))
            .build()
            .unwrap();
        let request = client
            .request(Method::GET, "/api/auth/me")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer secret")
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_fast() {
        // Port 9 (discard) is almost never listening on loopback
        let client = HttpApiClientBuilder::new()
            .base_url("http://127.0.0.1:9")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let err = client.list_tags(Locale::En).await.unwrap_err();
        assert!(
            matches!(err, ApiError::ConnectionRefused(_)),
            "unexpected error: {err:?}"
        );
    }
}
