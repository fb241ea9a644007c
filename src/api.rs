use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
    Router,
};
use chrono::{SecondsFormat, Utc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{self, AuthenticatedUser};
use crate::shared::{AppError, AppState};
use crate::users;

pub const API_PREFIX: &str = "/api/v1";

/// Logged in place of a user id when the request was not authenticated
pub const NO_USER: &str = "<none>";

/// Builds the HTTP router.
///
/// Only routes registered before the auth `route_layer` sit behind the gate.
/// Unmatched paths fall through to a bare 404 without touching it.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/logout", post(users::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let public = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login));

    Router::new()
        .nest(API_PREFIX, protected.merge(public))
        .fallback(not_found)
        .layer(middleware::from_fn(request_log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Endpoints registered by `build_router`, for start-up logging
pub fn registered_endpoints() -> Vec<String> {
    ["users/register", "users/login", "users/logout"]
        .iter()
        .map(|path| format!("POST {}/{}", API_PREFIX, path))
        .collect()
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Emits one structured line per request, whatever path it took
pub async fn request_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Utc::now();
    let started = std::time::Instant::now();

    let response = next.run(req).await;

    let latency = started.elapsed();
    let end = Utc::now();
    let user_id = response
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.user_id.to_string())
        .unwrap_or_else(|| NO_USER.to_string());

    info!(
        target: "api",
        method = %method,
        path = %path,
        user_id = %user_id,
        start = %start.to_rfc3339_opts(SecondsFormat::Millis, true),
        end = %end.to_rfc3339_opts(SecondsFormat::Millis, true),
        latency_ms = latency.as_secs_f64() * 1000.0,
        status = response.status().as_u16(),
        "request completed"
    );

    response
}
