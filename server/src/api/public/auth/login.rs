use crate::api::{error_response, ErrorResponse};
use crate::auth::{create_session, verify_password};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use pantry_core::types::LoginRequest;
use pantry_core::AuthSession;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"email": "cook@example.com", "password": "password123"})),
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // email is COLLATE NOCASE
    let user: User = match users::table
        .filter(users::email.eq(req.email.trim()))
        .select(User::as_select())
        .first(&mut conn)
    {
        Ok(u) => u,
        Err(_) => return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };

    // Google-only accounts have no password
    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&req.password, hash));
    if !verified {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let token = match create_session(&mut conn, user.id) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session");
        }
    };

    (
        StatusCode::OK,
        Json(AuthSession {
            token,
            user: user.profile(),
        }),
    )
        .into_response()
}
