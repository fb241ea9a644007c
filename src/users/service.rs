use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::{hash_password, verify_password},
    repository::UserRepository,
    types::RegisterRequest,
};
use crate::shared::AppError;

/// Service for account registration and credential checks
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Registers a new account. Duplicate usernames or emails come back as
    /// field validation errors.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register_user(&self, request: &RegisterRequest) -> Result<i64, AppError> {
        if self.repository.exists_by_username(&request.username).await? {
            warn!("Username already in use");
            return Err(AppError::field("username", "Username already in use"));
        }

        if self.repository.exists_by_email(&request.email).await? {
            warn!("Email already in use");
            return Err(AppError::field("email", "Email already in use"));
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| AppError::Internal(e.to_string()))?;

        let user_id = self
            .repository
            .insert(&request.username, &request.email, &password_hash)
            .await?;

        info!(user_id, "User registered");
        Ok(user_id)
    }

    /// Checks a login (username or email) and password, returning the user id on a match
    #[instrument(skip(self, password))]
    pub async fn verify(&self, login: &str, password: &str) -> Result<Option<i64>, AppError> {
        let Some(user) = self.repository.find_by_login(login).await? else {
            return Ok(None);
        };

        let matches = verify_password(password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(matches.then_some(user.id))
    }
}
