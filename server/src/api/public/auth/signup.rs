use crate::api::{error_response, ErrorResponse};
use crate::auth::{create_session, hash_password};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use pantry_core::types::SignupRequest;
use pantry_core::AuthSession;
use std::sync::Arc;

pub const MIN_PASSWORD_LEN: usize = 8;

fn validate(req: &SignupRequest) -> Result<(), &'static str> {
    let email = req.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err("Invalid email address"),
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body(content = SignupRequest, example = json!({"email": "cook@example.com", "password": "password123"})),
    responses(
        (status = 201, description = "User created successfully", body = AuthSession),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<SignupRequest>,
) -> impl IntoResponse {
    if let Err(message) = validate(&req) {
        return error_response(StatusCode::BAD_REQUEST, message);
    }

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password");
        }
    };

    let mut conn = get_conn!(pool);

    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let new_user = NewUser {
        email: req.email.trim(),
        display_name,
        password_hash: Some(&password_hash),
        google_sub: None,
    };

    let user: User = match diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => return error_response(StatusCode::CONFLICT, "Email already registered"),
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user");
        }
    };

    let token = match create_session(&mut conn, user.id) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session");
        }
    };

    tracing::info!(user_id = user.id, "user signed up");
    (
        StatusCode::CREATED,
        Json(AuthSession {
            token,
            user: user.profile(),
        }),
    )
        .into_response()
}
