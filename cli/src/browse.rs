//! Recipe search, detail and suggestion commands.

use anyhow::Result;
use pantry_core::{
    calculate_ingredient_match, fetch_suggestions, FilterStore, LanguageStore, PageAccumulator,
    RecipeApi, RecipeSummary, SortOrder, Storage, TimeBucket,
};
use std::io::Write;

use crate::output;
use crate::pantry::load_ingredients;

/// Filter changes requested on the command line. `None` keeps the saved
/// value.
#[derive(Debug, Default, Clone)]
pub struct FilterArgs {
    pub meal_type: Option<String>,
    pub kitchen: Option<String>,
    pub diets: Option<Vec<String>>,
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
    pub by_time: Option<TimeBucket>,
    pub reset: bool,
}

impl FilterArgs {
    /// Apply onto the saved filters. Empty strings clear a filter.
    fn apply(&self, filters: &mut FilterStore) {
        if self.reset {
            filters.reset();
        }
        if let Some(meal_type) = &self.meal_type {
            filters.set_meal_type(Some(meal_type.clone()));
        }
        if let Some(kitchen) = &self.kitchen {
            filters.set_kitchen(Some(kitchen.clone()));
        }
        if let Some(diets) = &self.diets {
            filters.set_diets(diets.clone());
        }
        if let Some(search) = &self.search {
            filters.set_search(Some(search.clone()));
        }
        if let Some(sort) = self.sort {
            filters.set_sort(sort);
        }
        if let Some(by_time) = self.by_time {
            filters.set_by_time(Some(by_time));
        }
    }
}

/// Load pages 1..=`pages` into one de-duplicated list, stopping early once
/// everything has been seen.
pub async fn accumulate(
    api: &dyn RecipeApi,
    filters: &mut FilterStore,
    locale: pantry_core::Locale,
    limit: i64,
    pages: u32,
) -> Result<PageAccumulator<RecipeSummary>> {
    let mut accumulator = PageAccumulator::new();
    for page in 1..=pages.max(1) {
        filters.set_page(page);
        let result = api.list_recipes(&filters.to_query(locale, limit)).await?;
        accumulator.apply(page, result.recipes, Some(result.pagination.total));
        if !accumulator.has_more() {
            break;
        }
    }
    Ok(accumulator)
}

pub async fn search(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    args: &FilterArgs,
    limit: i64,
    pages: u32,
) -> Result<()> {
    let locale = LanguageStore::load(storage).locale;
    let mut filters = FilterStore::load(storage);
    args.apply(&mut filters);

    let accumulator = accumulate(api, &mut filters, locale, limit, pages).await?;
    filters.save(storage)?;

    output::recipe_list(out, accumulator.items(), locale)?;
    if let Some(total) = accumulator.total() {
        writeln!(out, "{} / {}", accumulator.len(), total)?;
    }
    if accumulator.has_more() {
        writeln!(out, "--pages {} for more", accumulator.current_page() + 1)?;
    }
    Ok(())
}

/// Show one recipe. Owned and missing lines come from the server when
/// `server_match` is set, otherwise they are computed locally.
pub async fn show(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    id: i32,
    server_match: bool,
) -> Result<()> {
    let locale = LanguageStore::load(storage).locale;
    let recipe = api.get_recipe(id, locale).await?;

    let ingredients = load_ingredients(api, storage).await?;
    let matched = if ingredients.selected().is_empty() {
        None
    } else if server_match {
        let ids: Vec<i32> = ingredients.selected().iter().copied().collect();
        Some(api.match_recipe(id, &ids).await?)
    } else {
        Some(calculate_ingredient_match(
            &recipe.ingredients,
            &ingredients.selected_ingredients(),
        ))
    };

    output::recipe_detail(out, &recipe, matched.as_ref(), locale)?;
    Ok(())
}

pub async fn suggest(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    per_section: i64,
) -> Result<()> {
    let locale = LanguageStore::load(storage).locale;
    let suggestions = fetch_suggestions(api, locale, per_section).await;

    for (section, recipes) in suggestions.sections() {
        if recipes.is_empty() {
            continue;
        }
        writeln!(out, "{}:", section)?;
        for recipe in recipes {
            output::recipe_line(out, recipe)?;
        }
    }
    if suggestions.is_empty() {
        output::recipe_list(out, &[], locale)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{
        Ingredient, IngredientCategory, Locale, MemoryStorage, MockApi, RecipeDetail,
        RecipeIngredientLine, Tag, TagKind,
    };

    fn dinner_tag() -> Tag {
        Tag {
            id: 3,
            slug: "dinner".to_string(),
            name: "Dinner".to_string(),
            kind: TagKind::MealType,
        }
    }

    fn recipe(id: i32, dinner: bool) -> RecipeDetail {
        RecipeDetail {
            id,
            title: format!("Recipe {}", id),
            description: None,
            image_url: None,
            cook_time_minutes: Some(id * 5),
            servings: None,
            instructions: "Cook.".to_string(),
            ingredients: vec![
                RecipeIngredientLine::resolved("200 g pasta", 12, "pasta"),
                RecipeIngredientLine::resolved("2 eggs", 6, "egg"),
                RecipeIngredientLine::text("salt"),
            ],
            tags: if dinner { vec![dinner_tag()] } else { Vec::new() },
        }
    }

    fn api() -> MockApi {
        let mut api = MockApi::new().with_categories(
            Locale::En,
            vec![IngredientCategory {
                name: "Pantry".to_string(),
                ingredients: vec![Ingredient {
                    id: 12,
                    name: "pasta".to_string(),
                    category: None,
                }],
            }],
        );
        for id in 1..=12 {
            api = api.with_recipe(Locale::En, recipe(id, id % 3 == 0));
        }
        api
    }

    #[tokio::test]
    async fn test_search_accumulates_pages() {
        let api = api();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();

        search(&api, &storage, &mut out, &FilterArgs::default(), 5, 2)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("10 / 12"));
        assert!(text.contains("--pages 3"));
        assert_eq!(api.call_count("list_recipes"), 2);
    }

    #[tokio::test]
    async fn test_search_filters_persist() {
        let api = api();
        let storage = MemoryStorage::new();

        let args = FilterArgs {
            meal_type: Some("dinner".to_string()),
            ..Default::default()
        };
        let mut out = Vec::new();
        search(&api, &storage, &mut out, &args, 10, 5).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("4 / 4"));
        // Everything fit on one page
        assert_eq!(api.call_count("list_recipes:dinner"), 1);

        // A later search without flags reuses the saved filter
        let mut out = Vec::new();
        search(&api, &storage, &mut out, &FilterArgs::default(), 10, 1)
            .await
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("4 / 4"));

        let reset = FilterArgs {
            reset: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        search(&api, &storage, &mut out, &reset, 20, 1).await.unwrap();
        assert!(String::from_utf8(out).unwrap().contains("12 / 12"));
    }

    #[tokio::test]
    async fn test_show_matches_selection_locally() {
        let api = api();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();
        crate::pantry::select(&api, &storage, &mut out, &["pasta".to_string()])
            .await
            .unwrap();

        let mut out = Vec::new();
        show(&api, &storage, &mut out, 3, false).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        // pasta owned, salt is a staple, eggs missing
        assert!(text.contains("67% (2/3)"));
        assert!(text.contains("  - 2 eggs"));
        assert_eq!(api.call_count("match_recipe"), 0);

        let mut out = Vec::new();
        show(&api, &storage, &mut out, 3, true).await.unwrap();
        assert!(String::from_utf8(out).unwrap().contains("67% (2/3)"));
        assert_eq!(api.call_count("match_recipe"), 1);
    }

    #[tokio::test]
    async fn test_show_missing_recipe() {
        let api = api();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();
        let err = show(&api, &storage, &mut out, 404, false).await.unwrap_err();
        assert!(err
            .downcast_ref::<pantry_core::ApiError>()
            .is_some_and(|e| e.is_not_found()));
    }

    #[tokio::test]
    async fn test_suggest_lists_sections() {
        let api = api();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();
        suggest(&api, &storage, &mut out, 2).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("dinner:"));
        assert!(text.contains("random:"));
        assert!(!text.contains("breakfast:"));
    }
}
