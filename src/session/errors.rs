use strum_macros::AsRefStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, AsRefStr)]
pub enum SessionError {
    /// The access record is absent: revoked on logout or expired by TTL.
    #[error("session not found")]
    NotFound,

    #[error("stored value is not a user id: {0}")]
    ValueCorrupt(String),

    #[error("session store unavailable: {0}")]
    Unavailable(String),

    /// The delete batch failed after the revocation index was read; some of
    /// the three keys may already be gone.
    #[error("session records only partially deleted: {0}")]
    PartialDelete(String),

    #[error("expiry for {key} is not in the future")]
    InvalidExpiry { key: String },
}

impl From<redis::RedisError> for SessionError {
    fn from(error: redis::RedisError) -> Self {
        SessionError::Unavailable(error.to_string())
    }
}
