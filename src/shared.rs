use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthFailure, AuthService};
use crate::users::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            auth_service,
            user_repository,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Any token or session check failure. The cause is only ever logged.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthFailure),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// The one place an error kind becomes an HTTP status
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::MalformedBody(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn field(field: &str, message: &str) -> Self {
        AppError::Validation(BTreeMap::from([(field.to_string(), message.to_string())]))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AppError::InvalidCredentials => {
                let body = Json(json!({
                    "errors": { "alert": "Invalid login credentials" }
                }));
                (status, body).into_response()
            }
            AppError::Validation(errors) => {
                (status, Json(json!({ "errors": errors }))).into_response()
            }
            // Everything else goes out with an empty body.
            _ => status.into_response(),
        }
    }
}
