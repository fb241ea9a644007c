use serde::{Deserialize, Serialize};

/// JWT claims carried by both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub uuid: String,
    pub sub: String, // User id (standard JWT subject claim)
    pub exp: i64,    // Expiration timestamp (standard JWT claim)
}

/// Freshly issued access/refresh pair.
///
/// The signed strings go back to the client; only the uuids and expiries
/// are used server-side to build session records.
#[derive(Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_uuid: String,
    pub refresh_uuid: String,
    pub access_expires: i64,
    pub refresh_expires: i64,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_uuid", &self.access_uuid)
            .field("refresh_uuid", &self.refresh_uuid)
            .field("access_expires", &self.access_expires)
            .field("refresh_expires", &self.refresh_expires)
            .finish_non_exhaustive()
    }
}

/// Identity recovered from a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaim {
    pub access_uuid: String,
    pub user_id: i64,
}
