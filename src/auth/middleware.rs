use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, AppState};

/// Authentication gate for protected routes.
///
/// Usage: `.route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth))`.
/// Handlers can then extract `Extension<AuthenticatedUser>`. The same value is
/// copied onto the response so the request log can report the user id.
#[instrument(skip_all)]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = match state.auth_service.authenticate(req.headers()).await {
        Ok(user) => user,
        Err(failure) => {
            warn!(
                kind = failure.kind(),
                error = %failure,
                path = %req.uri().path(),
                "Authentication failed"
            );
            return Err(AppError::Unauthorized(failure));
        }
    };

    debug!(user_id = user.user_id, "Authentication successful, adding user to request");

    req.extensions_mut().insert(user.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(user);

    Ok(response)
}
