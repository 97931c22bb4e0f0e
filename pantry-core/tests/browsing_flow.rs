//! End-to-end client flows against the in-memory API: browse with filters
//! and "show more", pick ingredients, open a recipe and match it.

use pantry_core::{
    calculate_ingredient_match, AuthStore, DiskStorage, FilterStore, Ingredient,
    IngredientCategory, IngredientStore, LanguageStore, Locale, MockApi, MockFailure,
    PageAccumulator, RecipeApi, RecipeDetail, RecipeIngredientLine, RecipeSummary, Storage, Tag,
    TagKind, TagStore,
};

fn tag(id: i32, kind: TagKind, slug: &str) -> Tag {
    Tag {
        id,
        slug: slug.to_string(),
        name: slug.to_string(),
        kind,
    }
}

fn recipe(id: i32, meal_type: &str, ingredients: Vec<RecipeIngredientLine>) -> RecipeDetail {
    RecipeDetail {
        id,
        title: format!("Recipe {:02}", id),
        description: None,
        image_url: None,
        cook_time_minutes: Some(10 * id),
        servings: Some(2),
        instructions: "Cook.".to_string(),
        ingredients,
        tags: vec![tag(1000 + id, TagKind::MealType, meal_type)],
    }
}

fn categories() -> Vec<IngredientCategory> {
    vec![
        IngredientCategory {
            name: "Vegetables".to_string(),
            ingredients: vec![
                Ingredient {
                    id: 1,
                    name: "tomato".to_string(),
                    category: Some("Vegetables".to_string()),
                },
                Ingredient {
                    id: 2,
                    name: "onion".to_string(),
                    category: Some("Vegetables".to_string()),
                },
            ],
        },
        IngredientCategory {
            name: "Dairy".to_string(),
            ingredients: vec![Ingredient {
                id: 3,
                name: "butter".to_string(),
                category: Some("Dairy".to_string()),
            }],
        },
    ]
}

/// 25 recipes: odd ids are dinners, even ids breakfasts.
fn catalog() -> MockApi {
    let mut api = MockApi::new()
        .with_categories(Locale::En, categories())
        .with_categories(
            Locale::Ru,
            vec![IngredientCategory {
                name: "Овощи".to_string(),
                ingredients: vec![Ingredient {
                    id: 101,
                    name: "помидор".to_string(),
                    category: Some("Овощи".to_string()),
                }],
            }],
        );
    for id in 1..=25 {
        let meal_type = if id % 2 == 1 { "dinner" } else { "breakfast" };
        api = api.with_recipe(
            Locale::En,
            recipe(
                id,
                meal_type,
                vec![
                    RecipeIngredientLine::resolved("2 tomatoes", 1, "tomato"),
                    RecipeIngredientLine::text("1 cup cream"),
                    RecipeIngredientLine::text("salt to taste"),
                ],
            ),
        );
    }
    api
}

async fn load_page(
    api: &dyn RecipeApi,
    filters: &FilterStore,
    acc: &mut PageAccumulator<RecipeSummary>,
) -> usize {
    let query = filters.to_query(Locale::En, 10);
    let page = api.list_recipes(&query).await.unwrap();
    acc.apply(filters.page(), page.recipes, Some(page.pagination.total))
}

#[tokio::test]
async fn test_show_more_until_exhausted() {
    let api = catalog();
    let mut filters = FilterStore::default();
    let mut acc = PageAccumulator::new();

    assert_eq!(load_page(&api, &filters, &mut acc).await, 10);
    assert!(acc.has_more());

    filters.set_page(acc.next_page());
    assert_eq!(load_page(&api, &filters, &mut acc).await, 10);

    filters.set_page(acc.next_page());
    assert_eq!(load_page(&api, &filters, &mut acc).await, 5);
    assert_eq!(acc.len(), 25);
    assert!(!acc.has_more());

    let mut ids: Vec<i32> = acc.items().iter().map(|r| r.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 25);
}

#[tokio::test]
async fn test_filter_change_restarts_accumulation() {
    let api = catalog();
    let mut filters = FilterStore::default();
    let mut acc = PageAccumulator::new();

    load_page(&api, &filters, &mut acc).await;
    filters.set_page(2);
    load_page(&api, &filters, &mut acc).await;
    assert_eq!(acc.len(), 20);

    filters.set_meal_type(Some("dinner".to_string()));
    assert_eq!(filters.page(), 1);
    load_page(&api, &filters, &mut acc).await;

    assert_eq!(acc.len(), 10);
    assert_eq!(acc.total(), Some(13));
    assert!(acc.items().iter().all(|r| r.id % 2 == 1));
}

#[tokio::test]
async fn test_selection_matches_recipe() {
    let api = catalog();
    let mut ingredients = IngredientStore::new(Locale::En);
    ingredients.refresh_categories(&api).await.unwrap();
    assert!(ingredients.toggle(1));

    let detail = api.get_recipe(7, Locale::En).await.unwrap();
    let result = calculate_ingredient_match(&detail.ingredients, &ingredients.selected_ingredients());

    // tomato by id, salt from the default pantry
    assert_eq!(result.owned_count, 2);
    assert_eq!(result.total_count, 3);
    assert_eq!(result.match_percentage, 67);
    assert_eq!(result.missing_lines[0].line, "1 cup cream");

    let server_side = api.match_recipe(7, &[1]).await.unwrap();
    assert_eq!(server_side, result);
}

#[tokio::test]
async fn test_categories_are_fetched_once_while_fresh() {
    let api = catalog();
    let mut ingredients = IngredientStore::new(Locale::En);
    ingredients.refresh_categories(&api).await.unwrap();
    ingredients.refresh_categories(&api).await.unwrap();
    assert_eq!(api.call_count("grouped_ingredients"), 1);
    assert_eq!(ingredients.all_ingredients().count(), 3);
}

#[tokio::test]
async fn test_language_switch_discards_selection() {
    let api = catalog();
    let mut language = LanguageStore::default();
    let mut ingredients = IngredientStore::new(language.locale);
    ingredients.refresh_categories(&api).await.unwrap();
    ingredients.select(1);
    ingredients.select(3);

    assert!(language.set_locale(Locale::Ru));
    assert!(ingredients.set_locale(language.locale));
    assert!(ingredients.selected().is_empty());
    assert!(ingredients.categories().is_empty());

    let categories = ingredients.refresh_categories(&api).await.unwrap();
    assert_eq!(categories[0].name, "Овощи");
    assert_eq!(api.call_count("grouped_ingredients"), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_cached_tags() {
    let api = MockApi::new().with_failure("list_tags", MockFailure::Status(503));
    let mut tags = TagStore::default();
    tags.store(
        pantry_core::TagLists::from_tags(vec![tag(1, TagKind::Diet, "vegan")]),
        Locale::En,
        0,
    );

    assert!(tags.refresh(&api, Locale::En).await.is_err());
    let cached = tags.cached(Locale::En).unwrap();
    assert_eq!(cached.diets[0].slug, "vegan");
}

#[tokio::test]
async fn test_missing_recipe_is_not_found() {
    let api = catalog();
    let err = api.get_recipe(999, Locale::En).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let api = catalog();

    {
        let storage = DiskStorage::new(dir.path().to_path_buf());
        let mut auth = AuthStore::default();
        auth.set_session(api.login(&pantry_core::types::LoginRequest {
            email: "cook@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap());
        auth.save(&storage).unwrap();

        let mut ingredients = IngredientStore::new(Locale::En);
        ingredients.refresh_categories(&api).await.unwrap();
        ingredients.select(2);
        ingredients.save(&storage).unwrap();

        let mut filters = FilterStore::default();
        filters.set_kitchen(Some("italian".to_string()));
        filters.save(&storage).unwrap();
    }

    let storage = DiskStorage::new(dir.path().to_path_buf());
    let auth = AuthStore::load(&storage);
    assert!(auth.is_authenticated());
    assert_eq!(auth.user().unwrap().email, "cook@example.com");

    let ingredients = IngredientStore::load(&storage);
    assert!(ingredients.is_selected(2));
    assert_eq!(ingredients.selected_ingredients()[0].name, "onion");

    assert_eq!(FilterStore::load(&storage).kitchen(), Some("italian"));

    let mut auth = auth;
    auth.clear();
    auth.save(&storage).unwrap();
    assert!(storage.read("auth").is_none());
}
