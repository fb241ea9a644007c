use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use recipe_library::{
    build_router,
    users::repository::InMemoryUserRepository,
    AppState, AuthService, InMemorySessionStore, SessionStore, TokenService,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const ACCESS_SECRET: &str = "secret value";
pub const REFRESH_SECRET: &str = "refresh value";

pub struct TestSetup {
    pub app: Router,
    pub auth_service: Arc<AuthService>,
    pub tokens: TokenService,
    /// Set when the default in-memory store is used
    pub memory_store: Option<Arc<InMemorySessionStore>>,
}

pub struct TestSetupBuilder {
    session_store: Option<Arc<dyn SessionStore + Send + Sync>>,
    store_timeout: Duration,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            session_store: None,
            store_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_session_store(mut self, store: Arc<dyn SessionStore + Send + Sync>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn build(self) -> TestSetup {
        let tokens = TokenService::new(ACCESS_SECRET, REFRESH_SECRET);

        let (session_store, memory_store) = match self.session_store {
            Some(store) => (store, None),
            None => {
                let store = Arc::new(InMemorySessionStore::new());
                let shared: Arc<dyn SessionStore + Send + Sync> = store.clone();
                (shared, Some(store))
            }
        };

        let auth_service = Arc::new(AuthService::new(
            tokens.clone(),
            session_store,
            self.store_timeout,
        ));
        let state = AppState::new(
            auth_service.clone(),
            Arc::new(InMemoryUserRepository::new()),
        );

        TestSetup {
            app: build_router(state),
            auth_service,
            tokens,
            memory_store,
        }
    }
}
