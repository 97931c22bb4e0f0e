pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/tags endpoints (mounted at /api/tags)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_tags))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_tags),
    components(schemas(pantry_core::TagLists, pantry_core::Tag, pantry_core::TagKind))
)]
pub struct ApiDoc;
