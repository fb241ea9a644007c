use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    errors::TokenError,
    types::{AccessClaim, TokenClaims, TokenPair},
};

/// Credential scheme expected in the Authorization header (lowercase, single space)
pub const AUTHORIZATION_SCHEME: &str = "bearer ";

const DEFAULT_ACCESS_MINUTES: i64 = 15;
const DEFAULT_REFRESH_DAYS: i64 = 7;

/// Issues and verifies signed access/refresh token pairs.
///
/// Access and refresh tokens are signed with separate secrets, so a holder of
/// one secret cannot mint the other kind of token. Nothing here touches the
/// session store.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenService {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_lifetime: Duration::minutes(DEFAULT_ACCESS_MINUTES),
            refresh_lifetime: Duration::days(DEFAULT_REFRESH_DAYS),
        }
    }

    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_lifetime = access;
        self.refresh_lifetime = refresh;
        self
    }

    /// Creates a fresh access/refresh pair for the given user
    #[instrument(skip(self))]
    pub fn create_token(&self, user_id: i64) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let access_uuid = Uuid::new_v4().to_string();
        let refresh_uuid = Uuid::new_v4().to_string();
        let access_expires = expiry_after(now, self.access_lifetime)?;
        let refresh_expires = expiry_after(now, self.refresh_lifetime)?;

        debug!(
            access_uuid = %access_uuid,
            refresh_uuid = %refresh_uuid,
            access_expires,
            refresh_expires,
            "Creating token pair"
        );

        let access_token = sign(
            &TokenClaims {
                uuid: access_uuid.clone(),
                sub: user_id.to_string(),
                exp: access_expires,
            },
            &self.access_secret,
        )?;
        let refresh_token = sign(
            &TokenClaims {
                uuid: refresh_uuid.clone(),
                sub: user_id.to_string(),
                exp: refresh_expires,
            },
            &self.refresh_secret,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_uuid,
            refresh_uuid,
            access_expires,
            refresh_expires,
        })
    }

    /// Extracts the bearer credential from the headers and verifies it as an access token
    #[instrument(skip(self, headers))]
    pub fn validate_token(&self, headers: &HeaderMap) -> Result<AccessClaim, TokenError> {
        let token = extract_bearer(headers).ok_or_else(|| {
            debug!("No bearer credential in Authorization header");
            TokenError::HeaderMissing
        })?;

        self.verify_access_token(token)
    }

    /// Verifies a raw access token string
    #[instrument(skip(self, token))]
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaim, TokenError> {
        let claims = verify(token, &self.access_secret)?;
        let user_id = claims.sub.parse::<i64>().map_err(|_| {
            debug!(sub = %claims.sub, "Token subject is not a user id");
            TokenError::Malformed(format!("invalid subject: {}", claims.sub))
        })?;

        debug!(access_uuid = %claims.uuid, user_id, "Access token verified");

        Ok(AccessClaim {
            access_uuid: claims.uuid,
            user_id,
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(AUTHORIZATION_SCHEME))
        .filter(|token| !token.is_empty())
}

/// Unix timestamp `lifetime` after `now`, failing instead of overflowing
fn expiry_after(now: DateTime<Utc>, lifetime: Duration) -> Result<i64, TokenError> {
    now.checked_add_signed(lifetime)
        .map(|expires| expires.timestamp())
        .ok_or_else(|| {
            debug!(lifetime = %lifetime, "Token lifetime overflows the date range");
            TokenError::Creation(format!("lifetime out of range: {}", lifetime))
        })
}

fn sign(claims: &TokenClaims, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        debug!(error = %e, "Failed to encode JWT token");
        TokenError::Creation(e.to_string())
    })
}

fn verify(token: &str, secret: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Store TTLs are computed from `exp` exactly, so no grace period here.
    validation.leeway = 0;

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!(error = %e, "Failed to decode JWT token");
        TokenError::from(e)
    })
}
