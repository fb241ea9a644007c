// Library crate for the recipe library API
// This file exposes the public API for integration tests

pub mod api;
pub mod auth;
pub mod config;
pub mod session;
pub mod shared;
pub mod token;
pub mod users;

// Re-export commonly used types for easier access in tests
pub use api::build_router;
pub use auth::{AuthFailure, AuthService, AuthenticatedUser};
pub use config::Config;
pub use session::{InMemorySessionStore, RedisSessionStore, SessionError, SessionStore};
pub use shared::{AppError, AppState};
pub use token::{AccessClaim, TokenError, TokenPair, TokenService};
