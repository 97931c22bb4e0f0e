pub mod auth;
pub mod testing;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/test/unauthed-ping",
            get(testing::unauthed_ping::unauthed_ping),
        )
        .route("/api/auth/signup", post(auth::signup::signup))
        .route("/api/auth/login", post(auth::login::login))
        .route("/api/auth/google", post(auth::google::google_login))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login::login,
        auth::signup::signup,
        auth::google::google_login,
        testing::unauthed_ping::unauthed_ping,
    ),
    components(schemas(
        pantry_core::types::LoginRequest,
        pantry_core::types::SignupRequest,
        pantry_core::types::GoogleLoginRequest,
        pantry_core::AuthSession,
        pantry_core::UserProfile,
        testing::unauthed_ping::UnauthedPingResponse,
    ))
)]
pub struct ApiDoc;
