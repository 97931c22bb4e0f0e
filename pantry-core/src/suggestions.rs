//! The "suggested recipes" home feed.

use serde::{Deserialize, Serialize};

use crate::client::RecipeApi;
use crate::i18n::Locale;
use crate::types::{RecipeQuery, RecipeSummary, SortOrder};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    pub breakfast: Vec<RecipeSummary>,
    pub lunch: Vec<RecipeSummary>,
    pub dinner: Vec<RecipeSummary>,
    pub random: Vec<RecipeSummary>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.breakfast.is_empty()
            && self.lunch.is_empty()
            && self.dinner.is_empty()
            && self.random.is_empty()
    }

    /// Sections in display order, labelled by meal type slug.
    pub fn sections(&self) -> [(&'static str, &[RecipeSummary]); 4] {
        [
            ("breakfast", &self.breakfast),
            ("lunch", &self.lunch),
            ("dinner", &self.dinner),
            ("random", &self.random),
        ]
    }
}

async fn fetch_section(
    api: &dyn RecipeApi,
    section: &'static str,
    query: RecipeQuery,
) -> Vec<RecipeSummary> {
    match api.list_recipes(&query).await {
        Ok(page) => page.recipes,
        Err(e) => {
            tracing::warn!(section, error = %e, "failed to load suggestions");
            Vec::new()
        }
    }
}

fn meal_query(locale: Locale, limit: i64, meal_type: &str) -> RecipeQuery {
    RecipeQuery {
        locale,
        limit,
        meal_type: Some(meal_type.to_string()),
        sort: SortOrder::Random,
        ..RecipeQuery::default()
    }
}

/// Load all four sections concurrently. A failing section comes back empty
/// instead of failing the whole feed.
pub async fn fetch_suggestions(
    api: &dyn RecipeApi,
    locale: Locale,
    per_section: i64,
) -> Suggestions {
    let limit = per_section.max(1);
    let random = RecipeQuery {
        locale,
        limit,
        sort: SortOrder::Random,
        ..RecipeQuery::default()
    };

    let (breakfast, lunch, dinner, random) = tokio::join!(
        fetch_section(api, "breakfast", meal_query(locale, limit, "breakfast")),
        fetch_section(api, "lunch", meal_query(locale, limit, "lunch")),
        fetch_section(api, "dinner", meal_query(locale, limit, "dinner")),
        fetch_section(api, "random", random),
    );

    Suggestions {
        breakfast,
        lunch,
        dinner,
        random,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockApi, MockFailure};
    use crate::types::{RecipeDetail, Tag, TagKind};

    fn recipe(id: i32, meal_type: &str) -> RecipeDetail {
        RecipeDetail {
            id,
            title: format!("Recipe {}", id),
            description: None,
            image_url: None,
            cook_time_minutes: Some(20),
            servings: Some(2),
            instructions: String::new(),
            tags: vec![Tag {
                id: 100 + id,
                slug: meal_type.to_string(),
                name: meal_type.to_string(),
                kind: TagKind::MealType,
            }],
            ingredients: vec![],
        }
    }

    fn api() -> MockApi {
        MockApi::new()
            .with_recipe(Locale::En, recipe(1, "breakfast"))
            .with_recipe(Locale::En, recipe(2, "lunch"))
            .with_recipe(Locale::En, recipe(3, "dinner"))
    }

    #[tokio::test]
    async fn test_all_sections_load() {
        let suggestions = fetch_suggestions(&api(), Locale::En, 5).await;
        assert_eq!(suggestions.breakfast.len(), 1);
        assert_eq!(suggestions.lunch[0].id, 2);
        assert_eq!(suggestions.dinner[0].id, 3);
        assert_eq!(suggestions.random.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_section_is_empty() {
        let api = api().with_failure("list_recipes:lunch", MockFailure::Status(500));
        let suggestions = fetch_suggestions(&api, Locale::En, 5).await;
        assert!(suggestions.lunch.is_empty());
        assert_eq!(suggestions.breakfast.len(), 1);
        assert_eq!(suggestions.dinner.len(), 1);
        assert_eq!(suggestions.random.len(), 3);
    }

    #[tokio::test]
    async fn test_everything_failing_yields_empty_feed() {
        let api = api().with_failure("list_recipes", MockFailure::Timeout);
        let suggestions = fetch_suggestions(&api, Locale::En, 5).await;
        assert!(suggestions.is_empty());
    }
}
