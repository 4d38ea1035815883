use axum::Json;
use axum::extract::State;
use blogspace_auth::AuthError;
use blogspace_core::{AppError, ErrorResponse};
use tracing::instrument;

use super::model::{CurrentUserResponse, LoginRequest, LoginResponse};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Login and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 401, description = "Incorrect Username or Password", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all, fields(email = %dto.email))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let issued = state
        .auth
        .login(&dto.email, &dto.password)
        .await
        .map_err(AuthError::into_app_error)?;

    Ok(Json(issued.into()))
}

/// Login and receive a bearer token (short form of `/api/v1/auth/login`)
#[utoipa::path(
    post,
    path = "/api/v1/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 401, description = "Incorrect Username or Password", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    state: State<AppState>,
    dto: ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    login_user(state, dto).await
}

/// Get the currently authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn get_current_user(auth_user: AuthUser) -> Json<CurrentUserResponse> {
    Json(auth_user.0.into())
}
