use crate::api::{error_response, resolve_locale, ErrorResponse, LocaleParams};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::TagRow;
use crate::schema::tags;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use pantry_core::TagLists;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    params(LocaleParams),
    responses(
        (status = 200, description = "Meal types, kitchens and diets", body = TagLists),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_tags(
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
    Query(params): Query<LocaleParams>,
) -> impl IntoResponse {
    let locale = resolve_locale(params.locale.as_deref(), &headers);
    let mut conn = get_conn!(pool);

    let rows: Vec<TagRow> = match tags::table
        .filter(tags::locale.eq(locale.as_str()))
        .order((tags::kind.asc(), tags::id.asc()))
        .select(TagRow::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch tags: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch tags");
        }
    };

    (
        StatusCode::OK,
        Json(TagLists::from_tags(rows.into_iter().filter_map(TagRow::into_tag))),
    )
        .into_response()
}
