// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use errors::SessionError;
pub use repository::{InMemorySessionStore, RedisSessionStore, SessionStore};

// Internal modules
mod cleanup_task;
mod errors;
pub mod keys;
mod repository;
