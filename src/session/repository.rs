use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{errors::SessionError, keys};
use crate::token::{AccessClaim, TokenPair};

/// Server-side session records backing token revocation.
///
/// `access:<uuid>` is the only authority for whether an access token is still
/// live; a verified signature alone is not enough.
#[async_trait]
pub trait SessionStore {
    /// Writes the access record, refresh record and access-to-refresh index,
    /// each expiring when the matching token does.
    async fn store_token_details(&self, user_id: i64, pair: &TokenPair)
        -> Result<(), SessionError>;

    /// Resolves the user id for a verified access claim
    async fn retrieve_token_details(&self, claim: &AccessClaim) -> Result<i64, SessionError>;

    /// Removes the records for an access uuid. Deleting keys that are already
    /// gone succeeds, so repeated logouts are safe.
    async fn delete_token_details(&self, access_uuid: &str) -> Result<(), SessionError>;
}

/// Seconds until `expires`, rejecting expiries that have already passed
fn ttl_seconds(expires: i64, now: i64, key: &str) -> Result<u64, SessionError> {
    let remaining = expires - now;
    if remaining <= 0 {
        warn!(key = %key, expires, now, "Refusing to store a record that is already expired");
        return Err(SessionError::InvalidExpiry {
            key: key.to_string(),
        });
    }
    Ok(remaining as u64)
}

fn parse_user_id(key: &str, value: &str) -> Result<i64, SessionError> {
    value.parse::<i64>().map_err(|_| {
        warn!(key = %key, "Stored session value is not a user id");
        SessionError::ValueCorrupt(value.to_string())
    })
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoredValue {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-memory implementation of SessionStore for development and testing
///
/// Expiry is enforced lazily on read, mirroring a key-value engine's TTL.
/// Expired entries stay in the map until `purge_expired` runs, which the
/// cleanup task does periodically. Data is lost when the application restarts.
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Writes a raw key with the given lifetime, bypassing the session layout
    pub async fn set_raw(&self, key: &str, value: &str, ttl: Duration) {
        self.entries.write().await.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Utc::now() + ttl,
            },
        );
    }

    /// Returns the value of a live key
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Removes a key without touching the rest of the session layout
    pub async fn remove_raw(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Remaining lifetime of a live key in whole seconds
    pub async fn ttl_of(&self, key: &str) -> Option<i64> {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| (entry.expires_at - now).num_seconds())
    }

    /// Number of keys that have not expired yet
    pub async fn live_key_count(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Number of keys held, expired or not
    pub async fn raw_key_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Drops expired keys, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[instrument(skip(self, pair), fields(access_uuid = %pair.access_uuid))]
    async fn store_token_details(
        &self,
        user_id: i64,
        pair: &TokenPair,
    ) -> Result<(), SessionError> {
        let now = Utc::now();
        let access_key = keys::access(&pair.access_uuid);
        let refresh_key = keys::refresh(&pair.refresh_uuid);
        let index_key = keys::access_to_refresh(&pair.access_uuid);

        let access_ttl = ttl_seconds(pair.access_expires, now.timestamp(), &access_key)?;
        let refresh_ttl = ttl_seconds(pair.refresh_expires, now.timestamp(), &refresh_key)?;

        let access_expires_at = now + Duration::seconds(access_ttl as i64);
        let refresh_expires_at = now + Duration::seconds(refresh_ttl as i64);

        let mut entries = self.entries.write().await;
        entries.insert(
            access_key,
            StoredValue {
                value: user_id.to_string(),
                expires_at: access_expires_at,
            },
        );
        entries.insert(
            refresh_key,
            StoredValue {
                value: user_id.to_string(),
                expires_at: refresh_expires_at,
            },
        );
        entries.insert(
            index_key,
            StoredValue {
                value: pair.refresh_uuid.clone(),
                expires_at: access_expires_at,
            },
        );

        debug!(user_id, access_ttl, refresh_ttl, "Session records stored in memory");
        Ok(())
    }

    #[instrument(skip(self, claim), fields(access_uuid = %claim.access_uuid))]
    async fn retrieve_token_details(&self, claim: &AccessClaim) -> Result<i64, SessionError> {
        let key = keys::access(&claim.access_uuid);
        match self.get_raw(&key).await {
            Some(value) => parse_user_id(&key, &value),
            None => {
                debug!("Session not found in memory");
                Err(SessionError::NotFound)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_token_details(&self, access_uuid: &str) -> Result<(), SessionError> {
        let now = Utc::now();
        let access_key = keys::access(access_uuid);
        let index_key = keys::access_to_refresh(access_uuid);

        let mut entries = self.entries.write().await;
        let refresh_uuid = entries
            .get(&index_key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone());

        match refresh_uuid {
            Some(refresh_uuid) => {
                let deleted = [
                    entries.remove(&access_key),
                    entries.remove(&keys::refresh(&refresh_uuid)),
                    entries.remove(&index_key),
                ]
                .iter()
                .filter(|removed| removed.is_some())
                .count();
                debug!(deleted, "Session records deleted from memory");
            }
            None => {
                entries.remove(&access_key);
                debug!("Revocation index missing, deleted access record only");
            }
        }

        Ok(())
    }
}

/// Redis implementation of session store
///
/// Multi-key writes and deletes go out as one MULTI/EXEC pipeline. Redis does
/// not roll back a transaction when one of its commands fails, so a failed
/// delete batch is reported as a partial delete rather than hidden.
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self::new(connection))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip(self, pair), fields(access_uuid = %pair.access_uuid))]
    async fn store_token_details(
        &self,
        user_id: i64,
        pair: &TokenPair,
    ) -> Result<(), SessionError> {
        let now = Utc::now().timestamp();
        let access_key = keys::access(&pair.access_uuid);
        let refresh_key = keys::refresh(&pair.refresh_uuid);
        let index_key = keys::access_to_refresh(&pair.access_uuid);

        let access_ttl = ttl_seconds(pair.access_expires, now, &access_key)?;
        let refresh_ttl = ttl_seconds(pair.refresh_expires, now, &refresh_key)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set_ex(&access_key, user_id, access_ttl)
            .ignore()
            .set_ex(&refresh_key, user_id, refresh_ttl)
            .ignore()
            .set_ex(&index_key, &pair.refresh_uuid, access_ttl)
            .ignore();

        pipe.query_async::<_, ()>(&mut self.connection.clone())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store session records in Redis");
                SessionError::from(e)
            })?;

        debug!(user_id, access_ttl, refresh_ttl, "Session records stored in Redis");
        Ok(())
    }

    #[instrument(skip(self, claim), fields(access_uuid = %claim.access_uuid))]
    async fn retrieve_token_details(&self, claim: &AccessClaim) -> Result<i64, SessionError> {
        let key = keys::access(&claim.access_uuid);
        let mut conn = self.connection.clone();

        let value: Option<String> = conn.get(&key).await.map_err(|e| {
            warn!(error = %e, "Failed to read session record from Redis");
            SessionError::from(e)
        })?;

        match value {
            Some(value) => parse_user_id(&key, &value),
            None => {
                debug!("Session not found in Redis");
                Err(SessionError::NotFound)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_token_details(&self, access_uuid: &str) -> Result<(), SessionError> {
        let access_key = keys::access(access_uuid);
        let index_key = keys::access_to_refresh(access_uuid);
        let mut conn = self.connection.clone();

        let refresh_uuid: Option<String> = conn.get(&index_key).await.map_err(|e| {
            warn!(error = %e, "Failed to read revocation index from Redis");
            SessionError::from(e)
        })?;

        let Some(refresh_uuid) = refresh_uuid else {
            // The refresh record, if still live, is left to expire on its own.
            let deleted: i64 = conn.del(&access_key).await.map_err(|e| {
                warn!(error = %e, "Failed to delete access record from Redis");
                SessionError::from(e)
            })?;
            debug!(deleted, "Revocation index missing, deleted access record only");
            return Ok(());
        };

        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(&access_key)
            .del(keys::refresh(&refresh_uuid))
            .del(&index_key);

        let (access, refresh, index): (i64, i64, i64) =
            pipe.query_async(&mut conn).await.map_err(|e| {
                warn!(error = %e, "Session delete batch failed");
                SessionError::PartialDelete(e.to_string())
            })?;

        debug!(
            deleted = access + refresh + index,
            "Session records deleted from Redis"
        );
        Ok(())
    }
}
