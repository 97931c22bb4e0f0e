use crate::api::{error_response, resolve_locale, ErrorResponse, LocaleParams};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::RecipeRow;
use crate::schema::recipes;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use pantry_core::RecipeDetail;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID"),
        LocaleParams
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeDetail),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Query(params): Query<LocaleParams>,
) -> impl IntoResponse {
    let locale = resolve_locale(params.locale.as_deref(), &headers);
    let mut conn = get_conn!(pool);

    // Ids are per language, so a recipe from another locale is not found
    let row: RecipeRow = match recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::locale.eq(locale.as_str()))
        .select(RecipeRow::as_select())
        .first(&mut conn)
        .optional()
    {
        Ok(Some(r)) => r,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipe");
        }
    };

    let ingredients = match super::load_ingredient_lines(&mut conn, row.id) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::error!("Failed to fetch ingredient lines: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipe");
        }
    };

    let tags = match super::load_tags(&mut conn, &[row.id]) {
        Ok(mut t) => t.remove(&row.id).unwrap_or_default(),
        Err(e) => {
            tracing::error!("Failed to fetch recipe tags: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipe");
        }
    };

    (
        StatusCode::OK,
        Json(RecipeDetail {
            id: row.id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            cook_time_minutes: row.cook_time_minutes,
            servings: row.servings,
            instructions: row.instructions,
            ingredients,
            tags,
        }),
    )
        .into_response()
}
