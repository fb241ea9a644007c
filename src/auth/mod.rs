// Public API - what other modules can use
pub use middleware::require_auth;
pub use service::{AuthService, IssueError};
pub use types::{AuthFailure, AuthenticatedUser};

// Internal modules
mod middleware;
mod service;
mod types;
