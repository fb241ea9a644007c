use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    service::UserService,
    types::{LoginRequest, LoginResponse, RegisterRequest},
};
use crate::auth::{AuthFailure, AuthenticatedUser};
use crate::shared::{AppError, AppState};

/// HTTP handler for account registration
///
/// POST /api/v1/users/register
#[instrument(name = "register", skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "Error decoding json body for registration");
        AppError::MalformedBody(e.body_text())
    })?;

    let errors = request.validate();
    if !errors.is_empty() {
        info!(fields = ?errors.keys().collect::<Vec<_>>(), "Registration failed validation");
        return Err(AppError::Validation(errors));
    }

    let service = UserService::new(Arc::clone(&state.user_repository));
    service.register_user(&request).await?;

    Ok(StatusCode::OK)
}

/// HTTP handler for logging in
///
/// POST /api/v1/users/login
/// Returns a fresh access/refresh token pair
#[instrument(name = "login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "Error decoding json body for login");
        AppError::MalformedBody(e.body_text())
    })?;

    let service = UserService::new(Arc::clone(&state.user_repository));
    let user_id = service
        .verify(&request.login, &request.password)
        .await?
        .ok_or_else(|| {
            info!("Invalid login credentials");
            AppError::InvalidCredentials
        })?;

    let pair = state.auth_service.issue_tokens(user_id).await.map_err(|e| {
        error!(user_id, error = %e, "Error creating session for user login");
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// HTTP handler for logging out; sits behind the auth gate
///
/// POST /api/v1/users/logout
#[instrument(name = "logout", skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<StatusCode, AppError> {
    state
        .auth_service
        .revoke(&user.access_uuid)
        .await
        .map_err(|e| {
            warn!(kind = e.as_ref(), error = %e, "Failed to revoke session on logout");
            AppError::Unauthorized(AuthFailure::Session(e))
        })?;

    Ok(StatusCode::OK)
}
