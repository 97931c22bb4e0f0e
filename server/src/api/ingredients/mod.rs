pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/ingredients endpoints (mounted at /api/ingredients)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_ingredients))
        .route("/grouped", get(list::grouped_ingredients))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_ingredients, list::grouped_ingredients),
    components(schemas(
        list::IngredientsResponse,
        list::CategoriesResponse,
        pantry_core::Ingredient,
        pantry_core::IngredientCategory,
    ))
)]
pub struct ApiDoc;
