use async_trait::async_trait;

use recipe_library::{AccessClaim, InMemorySessionStore, SessionError, SessionStore, TokenPair};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Session store whose backend is down for every call
pub struct UnavailableSessionStore;

#[async_trait]
impl SessionStore for UnavailableSessionStore {
    async fn store_token_details(
        &self,
        _user_id: i64,
        _pair: &TokenPair,
    ) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("connection refused".to_string()))
    }

    async fn retrieve_token_details(&self, _claim: &AccessClaim) -> Result<i64, SessionError> {
        Err(SessionError::Unavailable("connection refused".to_string()))
    }

    async fn delete_token_details(&self, _access_uuid: &str) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("connection refused".to_string()))
    }
}

/// Session store that writes normally but never answers lookups
pub struct StalledSessionStore {
    inner: InMemorySessionStore,
}

impl StalledSessionStore {
    pub fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
        }
    }
}

#[async_trait]
impl SessionStore for StalledSessionStore {
    async fn store_token_details(
        &self,
        user_id: i64,
        pair: &TokenPair,
    ) -> Result<(), SessionError> {
        self.inner.store_token_details(user_id, pair).await
    }

    async fn retrieve_token_details(&self, _claim: &AccessClaim) -> Result<i64, SessionError> {
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        Err(SessionError::NotFound)
    }

    async fn delete_token_details(&self, access_uuid: &str) -> Result<(), SessionError> {
        self.inner.delete_token_details(access_uuid).await
    }
}

/// Session store whose delete batch breaks partway through
pub struct FailingDeleteSessionStore {
    inner: InMemorySessionStore,
}

impl FailingDeleteSessionStore {
    pub fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
        }
    }
}

#[async_trait]
impl SessionStore for FailingDeleteSessionStore {
    async fn store_token_details(
        &self,
        user_id: i64,
        pair: &TokenPair,
    ) -> Result<(), SessionError> {
        self.inner.store_token_details(user_id, pair).await
    }

    async fn retrieve_token_details(&self, claim: &AccessClaim) -> Result<i64, SessionError> {
        self.inner.retrieve_token_details(claim).await
    }

    async fn delete_token_details(&self, _access_uuid: &str) -> Result<(), SessionError> {
        Err(SessionError::PartialDelete("EXECABORT".to_string()))
    }
}
