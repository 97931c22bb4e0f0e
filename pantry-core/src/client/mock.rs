//! In-memory [`RecipeApi`] for tests.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, RwLock};

use super::RecipeApi;
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::matching::{calculate_ingredient_match, MatchResult};
use crate::types::{
    AuthSession, Ingredient, IngredientCategory, LoginRequest, PaginationMetadata, RecipeDetail,
    RecipePage, RecipeQuery, RecipeSummary, SignupRequest, TagKind, TagLists, UserProfile,
};

/// Failure injected into a mock endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    NotFound,
    Unauthorized,
    Timeout,
    ConnectionRefused,
    Status(u16),
}

impl MockFailure {
    fn to_error(self) -> ApiError {
        match self {
            MockFailure::NotFound => ApiError::NotFound,
            MockFailure::Unauthorized => ApiError::Unauthorized("mock".to_string()),
            MockFailure::Timeout => ApiError::Timeout(0),
            MockFailure::ConnectionRefused => ApiError::ConnectionRefused("mock".to_string()),
            MockFailure::Status(status) => ApiError::Status {
                status,
                message: "mock failure".to_string(),
            },
        }
    }
}

/// Canned catalog served from memory.
///
/// Failures are keyed by endpoint name (`"list_tags"`), or for recipe
/// listings by `"list_recipes:<meal_type>"`.
#[derive(Default)]
pub struct MockApi {
    recipes: HashMap<Locale, Vec<RecipeDetail>>,
    categories: HashMap<Locale, Vec<IngredientCategory>>,
    tags: HashMap<Locale, TagLists>,
    failures: HashMap<String, MockFailure>,
    favorites: RwLock<BTreeSet<i32>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(mut self, locale: Locale, recipe: RecipeDetail) -> Self {
        self.recipes.entry(locale).or_default().push(recipe);
        self
    }

    pub fn with_categories(mut self, locale: Locale, categories: Vec<IngredientCategory>) -> Self {
        self.categories.insert(locale, categories);
        self
    }

    pub fn with_tags(mut self, locale: Locale, tags: TagLists) -> Self {
        self.tags.insert(locale, tags);
        self
    }

    pub fn with_failure(mut self, endpoint: &str, failure: MockFailure) -> Self {
        self.failures.insert(endpoint.to_string(), failure);
        self
    }

    /// Endpoint names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == endpoint).count()
    }

    fn record(&self, endpoint: &str) -> Result<(), ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint.to_string());
        }
        match self.failures.get(endpoint) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn recipes_for(&self, locale: Locale) -> &[RecipeDetail] {
        self.recipes.get(&locale).map(Vec::as_slice).unwrap_or(&[])
    }

    fn session(email: &str) -> AuthSession {
        AuthSession {
            token: format!("mock-token-{}", email),
            user: UserProfile {
                id: 1,
                email: email.to_string(),
                display_name: None,
            },
        }
    }
}

fn summary(recipe: &RecipeDetail) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        title: recipe.title.clone(),
        description: recipe.description.clone(),
        image_url: recipe.image_url.clone(),
        cook_time_minutes: recipe.cook_time_minutes,
        tags: recipe.tags.clone(),
    }
}

fn has_tag(recipe: &RecipeDetail, kind: TagKind, slug: &str) -> bool {
    recipe.tags.iter().any(|t| t.kind == kind && t.slug == slug)
}

fn matches_query(recipe: &RecipeDetail, query: &RecipeQuery) -> bool {
    if let Some(meal_type) = &query.meal_type {
        if !has_tag(recipe, TagKind::MealType, meal_type) {
            return false;
        }
    }
    if let Some(kitchen) = &query.kitchen {
        if !has_tag(recipe, TagKind::Kitchen, kitchen) {
            return false;
        }
    }
    if !query.diets.iter().all(|d| has_tag(recipe, TagKind::Diet, d)) {
        return false;
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        let in_title = recipe.title.to_lowercase().contains(&needle);
        let in_description = recipe
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle));
        if !in_title && !in_description {
            return false;
        }
    }
    if let Some(bucket) = query.by_time {
        if !recipe.cook_time_minutes.is_some_and(|m| bucket.contains(m)) {
            return false;
        }
    }
    true
}

#[async_trait]
impl RecipeApi for MockApi {
    async fn list_recipes(&self, query: &RecipeQuery) -> Result<RecipePage, ApiError> {
        self.record("list_recipes")?;
        if let Some(meal_type) = &query.meal_type {
            self.record(&format!("list_recipes:{}", meal_type))?;
        }

        let mut matching: Vec<&RecipeDetail> = self
            .recipes_for(query.locale)
            .iter()
            .filter(|r| matches_query(r, query))
            .collect();

        // Ids stand in for creation order
        match query.sort {
            crate::types::SortOrder::Newest | crate::types::SortOrder::Random => {
                matching.sort_by(|a, b| b.id.cmp(&a.id))
            }
            crate::types::SortOrder::Oldest => matching.sort_by_key(|r| r.id),
            crate::types::SortOrder::CookTimeAsc => matching.sort_by_key(|r| r.cook_time_minutes),
            crate::types::SortOrder::CookTimeDesc => {
                matching.sort_by(|a, b| b.cook_time_minutes.cmp(&a.cook_time_minutes))
            }
            crate::types::SortOrder::Title => matching.sort_by(|a, b| a.title.cmp(&b.title)),
        }

        let total = matching.len() as i64;
        let recipes = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .map(summary)
            .collect();

        Ok(RecipePage {
            recipes,
            pagination: PaginationMetadata {
                total,
                limit: query.limit,
                offset: query.offset,
            },
        })
    }

    async fn get_recipe(&self, id: i32, locale: Locale) -> Result<RecipeDetail, ApiError> {
        self.record("get_recipe")?;
        self.recipes_for(locale)
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn list_ingredients(&self, locale: Locale) -> Result<Vec<Ingredient>, ApiError> {
        self.record("list_ingredients")?;
        Ok(self
            .categories
            .get(&locale)
            .map(|cats| {
                cats.iter()
                    .flat_map(|c| c.ingredients.iter().cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn grouped_ingredients(
        &self,
        locale: Locale,
    ) -> Result<Vec<IngredientCategory>, ApiError> {
        self.record("grouped_ingredients")?;
        Ok(self.categories.get(&locale).cloned().unwrap_or_default())
    }

    async fn list_tags(&self, locale: Locale) -> Result<TagLists, ApiError> {
        self.record("list_tags")?;
        Ok(self.tags.get(&locale).cloned().unwrap_or_default())
    }

    async fn match_recipe(
        &self,
        id: i32,
        ingredient_ids: &[i32],
    ) -> Result<MatchResult, ApiError> {
        self.record("match_recipe")?;
        let recipe = self
            .recipes
            .values()
            .flatten()
            .find(|r| r.id == id)
            .ok_or(ApiError::NotFound)?;
        let owned: Vec<Ingredient> = self
            .categories
            .values()
            .flatten()
            .flat_map(|c| c.ingredients.iter())
            .filter(|i| ingredient_ids.contains(&i.id))
            .cloned()
            .collect();
        Ok(calculate_ingredient_match(&recipe.ingredients, &owned))
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthSession, ApiError> {
        self.record("signup")?;
        Ok(Self::session(&request.email))
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        self.record("login")?;
        Ok(Self::session(&request.email))
    }

    async fn google_login(
        &self,
        code: &str,
        _redirect_uri: Option<&str>,
    ) -> Result<AuthSession, ApiError> {
        self.record("google_login")?;
        Ok(Self::session(&format!("{}@gmail.com", code)))
    }

    async fn me(&self) -> Result<UserProfile, ApiError> {
        self.record("me")?;
        Ok(Self::session("mock@example.com").user)
    }

    async fn favorites(&self, locale: Locale) -> Result<Vec<RecipeSummary>, ApiError> {
        self.record("favorites")?;
        let favorites = self
            .favorites
            .read()
            .map(|f| f.clone())
            .unwrap_or_default();
        Ok(self
            .recipes_for(locale)
            .iter()
            .filter(|r| favorites.contains(&r.id))
            .map(summary)
            .collect())
    }

    async fn add_favorite(&self, recipe_id: i32) -> Result<(), ApiError> {
        self.record("add_favorite")?;
        if let Ok(mut favorites) = self.favorites.write() {
            favorites.insert(recipe_id);
        }
        Ok(())
    }

    async fn remove_favorite(&self, recipe_id: i32) -> Result<(), ApiError> {
        self.record("remove_favorite")?;
        if let Ok(mut favorites) = self.favorites.write() {
            favorites.remove(&recipe_id);
        }
        Ok(())
    }
}
