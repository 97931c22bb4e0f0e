use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::AppState;
use axum::routing::get;
use axum::{response::IntoResponse, Json, Router};
use pantry_core::UserProfile;
use utoipa::OpenApi;

/// Returns the router for the current-user endpoint (auth required)
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "The signed-in user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(user.profile())
}

#[derive(OpenApi)]
#[openapi(paths(me), components(schemas(UserProfile)))]
pub struct ApiDoc;
