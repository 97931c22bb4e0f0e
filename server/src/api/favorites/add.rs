use crate::api::{error_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewFavorite;
use crate::schema::{favorites, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/favorites/{recipe_id}",
    tag = "favorites",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Recipe saved"),
        (status = 204, description = "Recipe was already saved"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(recipe_id): Path<i32>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    match recipes::table
        .filter(recipes::id.eq(recipe_id))
        .select(recipes::id)
        .first::<i32>(&mut conn)
        .optional()
    {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save favorite");
        }
    }

    let inserted = match diesel::insert_or_ignore_into(favorites::table)
        .values(&NewFavorite {
            user_id: user.id,
            recipe_id,
        })
        .execute(&mut conn)
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to save favorite: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save favorite");
        }
    };

    if inserted == 0 {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}
