use axum::http::HeaderMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::types::{AuthFailure, AuthenticatedUser};
use crate::session::{SessionError, SessionStore};
use crate::token::{TokenError, TokenPair, TokenService};

/// Composes token verification with session-store lookups.
///
/// Every store call is bounded by `store_timeout`; a timeout is reported as
/// `SessionError::Unavailable` so callers fail closed.
pub struct AuthService {
    tokens: TokenService,
    sessions: Arc<dyn SessionStore + Send + Sync>,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(
        tokens: TokenService,
        sessions: Arc<dyn SessionStore + Send + Sync>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            tokens,
            sessions,
            store_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates a token pair for a verified user and records its session
    #[instrument(skip(self))]
    pub async fn issue_tokens(&self, user_id: i64) -> Result<TokenPair, IssueError> {
        let pair = self.tokens.create_token(user_id)?;

        self.bounded(self.sessions.store_token_details(user_id, &pair))
            .await?;

        info!(user_id, access_uuid = %pair.access_uuid, "Issued token pair");
        Ok(pair)
    }

    /// Runs the gate checks: signature first, then the session record
    #[instrument(skip(self, headers))]
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthFailure> {
        let claim = self.tokens.validate_token(headers)?;

        let user_id = self
            .bounded(self.sessions.retrieve_token_details(&claim))
            .await?;

        Ok(AuthenticatedUser {
            user_id,
            access_uuid: claim.access_uuid,
        })
    }

    /// Revokes the session behind an access uuid
    #[instrument(skip(self))]
    pub async fn revoke(&self, access_uuid: &str) -> Result<(), SessionError> {
        self.bounded(self.sessions.delete_token_details(access_uuid))
            .await?;

        info!(access_uuid = %access_uuid, "Session revoked");
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>>,
    {
        match tokio::time::timeout(self.store_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.store_timeout, "Session store call timed out");
                Err(SessionError::Unavailable(format!(
                    "timed out after {:?}",
                    self.store_timeout
                )))
            }
        }
    }
}

/// Failure while issuing tokens after credentials were already verified
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum IssueError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
