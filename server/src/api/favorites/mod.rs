pub mod add;
pub mod list;
pub mod remove;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/favorites endpoints (auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/favorites", get(list::list_favorites))
        .route(
            "/api/favorites/{recipe_id}",
            post(add::add_favorite).delete(remove::remove_favorite),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_favorites, add::add_favorite, remove::remove_favorite),
    components(schemas(list::FavoritesResponse))
)]
pub struct ApiDoc;
