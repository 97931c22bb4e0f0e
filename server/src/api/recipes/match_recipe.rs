use crate::api::{error_response, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::IngredientRow;
use crate::schema::{ingredients, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use pantry_core::types::MatchRequest;
use pantry_core::{calculate_ingredient_match, Ingredient, MatchResult};
use std::sync::Arc;

/// Upper bound on the selection size accepted in one request.
const MAX_SELECTED: usize = 500;

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/match",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body(content = MatchRequest, example = json!({"ingredient_ids": [1, 6, 13]})),
    responses(
        (status = 200, description = "Owned and missing ingredient lines", body = MatchResult),
        (status = 400, description = "Too many ingredients", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn match_recipe(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(req): Json<MatchRequest>,
) -> impl IntoResponse {
    if req.ingredient_ids.len() > MAX_SELECTED {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("At most {} ingredients can be matched at once", MAX_SELECTED),
        );
    }

    let mut conn = get_conn!(pool);

    let exists = match recipes::table
        .filter(recipes::id.eq(id))
        .select(recipes::id)
        .first::<i32>(&mut conn)
        .optional()
    {
        Ok(found) => found.is_some(),
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to match recipe");
        }
    };
    if !exists {
        return error_response(StatusCode::NOT_FOUND, "Recipe not found");
    }

    let lines = match super::load_ingredient_lines(&mut conn, id) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::error!("Failed to fetch ingredient lines: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to match recipe");
        }
    };

    // Unknown ids are ignored
    let owned: Vec<Ingredient> = match ingredients::table
        .filter(ingredients::id.eq_any(&req.ingredient_ids))
        .select(IngredientRow::as_select())
        .load::<IngredientRow>(&mut conn)
    {
        Ok(rows) => rows.into_iter().map(Ingredient::from).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch ingredients: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to match recipe");
        }
    };

    (StatusCode::OK, Json(calculate_ingredient_match(&lines, &owned))).into_response()
}
