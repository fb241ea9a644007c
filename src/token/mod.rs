// Public API - what other modules can use
pub use errors::TokenError;
pub use service::{TokenService, AUTHORIZATION_SCHEME};
pub use types::{AccessClaim, TokenClaims, TokenPair};

// Internal modules
mod errors;
mod service;
mod types;
