use thiserror::Error;

use crate::session::SessionError;
use crate::token::TokenError;

/// Identity attached to a request that passed the auth gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub access_uuid: String,
}

/// Why a request was refused. Kept for logs only; every variant becomes the
/// same bare 401.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthFailure {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthFailure {
    /// Short name of the failed check, e.g. `SignatureInvalid`
    pub fn kind(&self) -> &str {
        match self {
            AuthFailure::Token(error) => error.as_ref(),
            AuthFailure::Session(error) => error.as_ref(),
        }
    }
}
