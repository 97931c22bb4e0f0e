use crate::api::{error_response, resolve_locale, ErrorResponse, LocaleParams};
use crate::db::DbPool;
use crate::models::IngredientRow;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use pantry_core::{message, Ingredient, IngredientCategory, Locale, MessageKey};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct IngredientsResponse {
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<IngredientCategory>,
}

/// All ingredients of `locale`, by category then name. Uncategorized
/// ingredients sort last.
fn load(pool: &DbPool, locale: Locale) -> Result<Vec<Ingredient>, Response> {
    let mut conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to get database connection: {}", e);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection failed",
            ));
        }
    };

    ingredients::table
        .filter(ingredients::locale.eq(locale.as_str()))
        .order((
            ingredients::category.is_null(),
            ingredients::category.asc(),
            ingredients::name.asc(),
        ))
        .select(IngredientRow::as_select())
        .load::<IngredientRow>(&mut conn)
        .map(|rows| rows.into_iter().map(Ingredient::from).collect())
        .map_err(|e| {
            tracing::error!("Failed to fetch ingredients: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch ingredients")
        })
}

/// Group a list already sorted by category into display sections.
fn group(ingredients: Vec<Ingredient>, locale: Locale) -> Vec<IngredientCategory> {
    let mut categories: Vec<IngredientCategory> = Vec::new();
    for ingredient in ingredients {
        let name = ingredient
            .category
            .clone()
            .unwrap_or_else(|| message(locale, MessageKey::OtherCategory).to_string());
        match categories.last_mut() {
            Some(last) if last.name == name => last.ingredients.push(ingredient),
            _ => categories.push(IngredientCategory {
                name,
                ingredients: vec![ingredient],
            }),
        }
    }
    categories
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(LocaleParams),
    responses(
        (status = 200, description = "Every ingredient in the catalog", body = IngredientsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
    Query(params): Query<LocaleParams>,
) -> impl IntoResponse {
    let locale = resolve_locale(params.locale.as_deref(), &headers);
    match load(&pool, locale) {
        Ok(ingredients) => (StatusCode::OK, Json(IngredientsResponse { ingredients })).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/ingredients/grouped",
    tag = "ingredients",
    params(LocaleParams),
    responses(
        (status = 200, description = "Ingredients grouped by category", body = CategoriesResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn grouped_ingredients(
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
    Query(params): Query<LocaleParams>,
) -> impl IntoResponse {
    let locale = resolve_locale(params.locale.as_deref(), &headers);
    match load(&pool, locale) {
        Ok(ingredients) => (
            StatusCode::OK,
            Json(CategoriesResponse {
                categories: group(ingredients, locale),
            }),
        )
            .into_response(),
        Err(response) => response,
    }
}
