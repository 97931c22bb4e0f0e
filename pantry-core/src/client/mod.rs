//! Data access layer for the Pantry REST backend.

mod http;
mod mock;
mod retry;

pub use http::{HttpApiClient, HttpApiClientBuilder};
pub use mock::{MockApi, MockFailure};
pub use retry::{with_retry, with_timeout, RetryPolicy};

use async_trait::async_trait;

use crate::error::ApiError;
use crate::i18n::Locale;
use crate::matching::MatchResult;
use crate::types::{
    AuthSession, Ingredient, IngredientCategory, LoginRequest, RecipeDetail, RecipePage,
    RecipeQuery, RecipeSummary, SignupRequest, TagLists, UserProfile,
};

/// Everything the client needs from the backend. Implemented over HTTP by
/// [`HttpApiClient`] and in memory by [`MockApi`].
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn list_recipes(&self, query: &RecipeQuery) -> Result<RecipePage, ApiError>;

    /// `ApiError::NotFound` when no recipe has this id.
    async fn get_recipe(&self, id: i32, locale: Locale) -> Result<RecipeDetail, ApiError>;

    async fn list_ingredients(&self, locale: Locale) -> Result<Vec<Ingredient>, ApiError>;

    async fn grouped_ingredients(
        &self,
        locale: Locale,
    ) -> Result<Vec<IngredientCategory>, ApiError>;

    async fn list_tags(&self, locale: Locale) -> Result<TagLists, ApiError>;

    /// Server-side owned/missing breakdown for one recipe.
    async fn match_recipe(&self, id: i32, ingredient_ids: &[i32])
        -> Result<MatchResult, ApiError>;

    async fn signup(&self, request: &SignupRequest) -> Result<AuthSession, ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError>;

    async fn google_login(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<AuthSession, ApiError>;

    async fn me(&self) -> Result<UserProfile, ApiError>;

    async fn favorites(&self, locale: Locale) -> Result<Vec<RecipeSummary>, ApiError>;

    async fn add_favorite(&self, recipe_id: i32) -> Result<(), ApiError>;

    async fn remove_favorite(&self, recipe_id: i32) -> Result<(), ApiError>;
}
