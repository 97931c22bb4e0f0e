use crate::api::{error_response, ErrorResponse};
use crate::auth::google::{exchange_code, GoogleAuthError};
use crate::auth::{create_session, find_or_create_google_user};
use crate::get_conn;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use pantry_core::types::GoogleLoginRequest;
use pantry_core::AuthSession;

#[utoipa::path(
    post,
    path = "/api/auth/google",
    tag = "auth",
    request_body(content = GoogleLoginRequest, example = json!({"code": "4/0Abc..."})),
    responses(
        (status = 200, description = "Signed in with Google", body = AuthSession),
        (status = 400, description = "Missing code", body = ErrorResponse),
        (status = 401, description = "Google rejected the code", body = ErrorResponse),
        (status = 502, description = "Google could not be reached", body = ErrorResponse),
        (status = 503, description = "Google sign-in not configured", body = ErrorResponse)
    )
)]
pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> impl IntoResponse {
    let code = req.code.trim();
    if code.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing authorization code");
    }

    let identity = match state.google.as_deref() {
        Some(config) => {
            exchange_code(&state.http, config, code, req.redirect_uri.as_deref()).await
        }
        None => Err(GoogleAuthError::NotConfigured),
    };

    let identity = match identity {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Google sign-in failed: {}", e);
            let status = match e {
                GoogleAuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                GoogleAuthError::RequestFailed(_) => StatusCode::BAD_GATEWAY,
                GoogleAuthError::Rejected(_) | GoogleAuthError::UnverifiedEmail => {
                    StatusCode::UNAUTHORIZED
                }
            };
            return error_response(status, e.to_string());
        }
    };

    let mut conn = get_conn!(state.pool);

    let user = match find_or_create_google_user(&mut conn, &identity) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Failed to load Google user: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to sign in");
        }
    };

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
