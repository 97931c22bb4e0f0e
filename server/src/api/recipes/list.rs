use crate::api::{error_response, resolve_locale, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::RecipeRow;
use crate::raw_sql::{count_over, like_pattern, random_order};
use crate::schema::recipes;
use crate::{recipe_has_tag, recipe_text_matches};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use pantry_core::{PaginationMetadata, RecipePage, SortOrder, TagKind, TimeBucket};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// `en` or `ru`; falls back to Accept-Language, then `en`
    pub locale: Option<String>,
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Meal type tag slug, e.g. `breakfast`
    pub meal_type: Option<String>,
    /// Kitchen tag slug, e.g. `italian`
    pub kitchen: Option<String>,
    /// Comma-separated diet tag slugs; a recipe must carry all of them
    pub diet: Option<String>,
    /// Case-insensitive text search over title and description
    pub q: Option<String>,
    /// newest (default), oldest, cook_time_asc, cook_time_desc, title, random
    pub sort: Option<String>,
    /// under_15, under_30, under_60, over_60
    pub by_time: Option<String>,
}

/// Validated form of [`ListRecipesParams`].
#[derive(Debug, PartialEq)]
struct Filters {
    limit: i64,
    offset: i64,
    meal_type: Option<String>,
    kitchen: Option<String>,
    diets: Vec<String>,
    search: Option<String>,
    sort: SortOrder,
    by_time: Option<TimeBucket>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Filters {
    fn from_params(params: &ListRecipesParams) -> Result<Self, String> {
        let sort = match non_empty(params.sort.as_deref()) {
            Some(s) => SortOrder::parse(&s).ok_or_else(|| format!("Unknown sort: {}", s))?,
            None => SortOrder::default(),
        };
        let by_time = match non_empty(params.by_time.as_deref()) {
            Some(s) => Some(TimeBucket::parse(&s).ok_or_else(|| format!("Unknown by_time: {}", s))?),
            None => None,
        };
        let mut diets: Vec<String> = params
            .diet
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|d| non_empty(Some(d)))
            .collect();
        diets.sort();
        diets.dedup();

        Ok(Self {
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: params.offset.unwrap_or(0).max(0),
            meal_type: non_empty(params.meal_type.as_deref()),
            kitchen: non_empty(params.kitchen.as_deref()),
            diets,
            search: non_empty(params.q.as_deref()),
            sort,
            by_time,
        })
    }
}

/// Recipes of `locale` matching every filter, unordered.
fn filtered<'a>(
    locale: &'a str,
    filters: &'a Filters,
    text_pattern: Option<&'a str>,
) -> recipes::BoxedQuery<'a, Sqlite> {
    let mut query = recipes::table
        .filter(recipes::locale.eq(locale))
        .into_boxed();

    if let Some(meal_type) = &filters.meal_type {
        query = query.filter(recipe_has_tag!(TagKind::MealType.as_str(), meal_type));
    }
    if let Some(kitchen) = &filters.kitchen {
        query = query.filter(recipe_has_tag!(TagKind::Kitchen.as_str(), kitchen));
    }
    // AND logic - must have ALL diets
    for diet in &filters.diets {
        query = query.filter(recipe_has_tag!(TagKind::Diet.as_str(), diet));
    }
    if let Some(pattern) = text_pattern {
        query = query.filter(recipe_text_matches!(pattern));
    }
    if let Some(bucket) = filters.by_time {
        let (min, max) = bucket.bounds();
        if let Some(min) = min {
            query = query.filter(recipes::cook_time_minutes.ge(min));
        }
        if let Some(max) = max {
            query = query.filter(recipes::cook_time_minutes.le(max));
        }
    }
    query
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "One page of matching recipes", body = RecipePage),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let locale = resolve_locale(params.locale.as_deref(), &headers);
    let filters = match Filters::from_params(&params) {
        Ok(f) => f,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    // Pre-compute the pattern so it lives long enough for the boxed query
    let text_pattern = filters.search.as_deref().map(like_pattern);

    let mut conn = get_conn!(pool);

    let query = filtered(locale.as_str(), &filters, text_pattern.as_deref());

    let query = match filters.sort {
        SortOrder::Newest => query.order(recipes::created_at.desc()),
        SortOrder::Oldest => query.order(recipes::created_at.asc()),
        // Recipes without a cook time go last either way
        SortOrder::CookTimeAsc => query.order((
            recipes::cook_time_minutes.is_null(),
            recipes::cook_time_minutes.asc(),
        )),
        SortOrder::CookTimeDesc => query.order((
            recipes::cook_time_minutes.is_null(),
            recipes::cook_time_minutes.desc(),
        )),
        SortOrder::Title => query.order(recipes::title.asc()),
        SortOrder::Random => query.order(random_order()),
    }
    .then_order_by(recipes::id.desc());

    // COUNT(*) OVER() computes the total count across all matching rows
    let results: Vec<(RecipeRow, i64)> = match query
        .select((RecipeRow::as_select(), count_over()))
        .limit(filters.limit)
        .offset(filters.offset)
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipes");
        }
    };

    // Past the last page there are no rows to read the total from
    let total = match results.first() {
        Some((_, total)) => *total,
        None if filters.offset > 0 => {
            match filtered(locale.as_str(), &filters, text_pattern.as_deref())
                .count()
                .get_result::<i64>(&mut conn)
            {
                Ok(total) => total,
                Err(e) => {
                    tracing::error!("Failed to count recipes: {}", e);
                    return error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to fetch recipes",
                    );
                }
            }
        }
        None => 0,
    };

    let (rows, _): (Vec<RecipeRow>, Vec<i64>) = results.into_iter().unzip();
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let tags = match super::load_tags(&mut conn, &ids) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to fetch recipe tags: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipes");
        }
    };

    (
        StatusCode::OK,
        Json(RecipePage {
            recipes: super::summarize(rows, tags),
            pagination: PaginationMetadata {
                total,
                limit: filters.limit,
                offset: filters.offset,
            },
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let filters = Filters::from_params(&ListRecipesParams::default()).unwrap();
        assert_eq!(filters.limit, 20);
        assert_eq!(filters.offset, 0);
        assert_eq!(filters.sort, SortOrder::Newest);
        assert!(filters.diets.is_empty());
    }

    #[test]
    fn test_limit_is_clamped() {
        let params = ListRecipesParams {
            limit: Some(5000),
            offset: Some(-3),
            ..Default::default()
        };
        let filters = Filters::from_params(&params).unwrap();
        assert_eq!(filters.limit, MAX_LIMIT);
        assert_eq!(filters.offset, 0);

        let params = ListRecipesParams {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(Filters::from_params(&params).unwrap().limit, 1);
    }

    #[test]
    fn test_diet_list_and_blank_values() {
        let params = ListRecipesParams {
            diet: Some("vegan, gluten_free,,vegan".to_string()),
            q: Some("   ".to_string()),
            meal_type: Some("".to_string()),
            ..Default::default()
        };
        let filters = Filters::from_params(&params).unwrap();
        assert_eq!(filters.diets, vec!["gluten_free", "vegan"]);
        assert!(filters.search.is_none());
        assert!(filters.meal_type.is_none());
    }

    #[test]
    fn test_unknown_enums_are_rejected() {
        let params = ListRecipesParams {
            sort: Some("popular".to_string()),
            ..Default::default()
        };
        assert!(Filters::from_params(&params).is_err());

        let params = ListRecipesParams {
            by_time: Some("under_5".to_string()),
            ..Default::default()
        };
        assert!(Filters::from_params(&params).is_err());
    }
}
