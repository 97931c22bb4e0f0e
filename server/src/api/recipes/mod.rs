pub mod get;
pub mod list;
pub mod match_recipe;

use crate::models::{IngredientLineRow, RecipeRow, TagRow};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use pantry_core::{RecipeIngredientLine, RecipeSummary, Tag};
use std::collections::HashMap;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes))
        .route("/{id}", get(get::get_recipe))
        .route("/{id}/match", post(match_recipe::match_recipe))
}

/// Tags for each of `recipe_ids`, in kind then slug order.
pub(crate) fn load_tags(
    conn: &mut SqliteConnection,
    recipe_ids: &[i32],
) -> QueryResult<HashMap<i32, Vec<Tag>>> {
    let rows: Vec<(i32, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(recipe_ids))
        .order((tags::kind.asc(), tags::slug.asc()))
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)?;

    let mut by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (recipe_id, row) in rows {
        if let Some(tag) = row.into_tag() {
            by_recipe.entry(recipe_id).or_default().push(tag);
        }
    }
    Ok(by_recipe)
}

/// Ingredient lines of one recipe in display order.
pub(crate) fn load_ingredient_lines(
    conn: &mut SqliteConnection,
    recipe_id: i32,
) -> QueryResult<Vec<RecipeIngredientLine>> {
    let rows: Vec<IngredientLineRow> = recipe_ingredients::table
        .left_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe_id))
        .order(recipe_ingredients::position.asc())
        .select((
            recipe_ingredients::line,
            recipe_ingredients::ingredient_id,
            ingredients::name.nullable(),
        ))
        .load(conn)?;
    Ok(rows.into_iter().map(RecipeIngredientLine::from).collect())
}

pub(crate) fn summarize(rows: Vec<RecipeRow>, mut tags: HashMap<i32, Vec<Tag>>) -> Vec<RecipeSummary> {
    rows.into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            tags: tags.remove(&r.id).unwrap_or_default(),
            title: r.title,
            description: r.description,
            image_url: r.image_url,
            cook_time_minutes: r.cook_time_minutes,
        })
        .collect()
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_recipes, get::get_recipe, match_recipe::match_recipe),
    components(schemas(
        pantry_core::RecipePage,
        pantry_core::RecipeSummary,
        pantry_core::RecipeDetail,
        pantry_core::RecipeIngredientLine,
        pantry_core::PaginationMetadata,
        pantry_core::Tag,
        pantry_core::TagKind,
        pantry_core::SortOrder,
        pantry_core::TimeBucket,
        pantry_core::MatchResult,
        pantry_core::types::MatchRequest,
    ))
)]
pub struct ApiDoc;
