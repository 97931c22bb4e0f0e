use crate::api::{error_response, resolve_locale, ErrorResponse, LocaleParams};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::RecipeRow;
use crate::schema::{favorites, recipes};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use pantry_core::RecipeSummary;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub recipes: Vec<RecipeSummary>,
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    params(LocaleParams),
    responses(
        (status = 200, description = "Saved recipes, most recently saved first", body = FavoritesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_favorites(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
    Query(params): Query<LocaleParams>,
) -> impl IntoResponse {
    let locale = resolve_locale(params.locale.as_deref(), &headers);
    let mut conn = get_conn!(pool);

    let rows: Vec<RecipeRow> = match favorites::table
        .inner_join(recipes::table)
        .filter(favorites::user_id.eq(user.id))
        .filter(recipes::locale.eq(locale.as_str()))
        .order((favorites::created_at.desc(), recipes::id.desc()))
        .select(RecipeRow::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch favorites: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch favorites");
        }
    };

    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let tags = match crate::api::recipes::load_tags(&mut conn, &ids) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to fetch recipe tags: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch favorites");
        }
    };

    (
        StatusCode::OK,
        Json(FavoritesResponse {
            recipes: crate::api::recipes::summarize(rows, tags),
        }),
    )
        .into_response()
}
