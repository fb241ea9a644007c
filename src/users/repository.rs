use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user account persistence
#[async_trait]
pub trait UserRepository {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;
    /// Inserts a new account and returns its id
    async fn insert(&self, username: &str, email: &str, password_hash: &str)
        -> Result<i64, AppError>;
    /// Looks an account up by username or email
    async fn find_by_login(&self, login: &str) -> Result<Option<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: RwLock<Vec<UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .any(|user| user.username == username))
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.read().await.iter().any(|user| user.email == email))
    }

    #[instrument(skip(self, password_hash))]
    async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, AppError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|user| user.username == username || user.email == email)
        {
            warn!(username = %username, "User already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }

        let id = users.len() as i64 + 1;
        users.push(UserModel {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        });

        debug!(user_id = id, "User inserted in memory");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_by_login(&self, login: &str) -> Result<Option<UserModel>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.username == login || user.email == login)
            .cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self))]
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to check username in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.get::<bool, _>(0))
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to check email in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.get::<bool, _>(0))
    }

    #[instrument(skip(self, password_hash))]
    async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, AppError> {
        let row = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert user into database");
            AppError::DatabaseError(e.to_string())
        })?;

        let id: i64 = row.get("id");
        debug!(user_id = id, "User inserted in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_by_login(&self, login: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1 OR email = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryUserRepository::new();
        let id = repo
            .insert("chef_anna", "anna@example.com", "hash")
            .await
            .unwrap();

        let by_username = repo.find_by_login("chef_anna").await.unwrap().unwrap();
        let by_email = repo.find_by_login("anna@example.com").await.unwrap().unwrap();
        assert_eq!(by_username.id, id);
        assert_eq!(by_email.id, id);
        assert!(repo.find_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exists_checks() {
        let repo = InMemoryUserRepository::new();
        repo.insert("chef_anna", "anna@example.com", "hash")
            .await
            .unwrap();

        assert!(repo.exists_by_username("chef_anna").await.unwrap());
        assert!(!repo.exists_by_username("chef_bob").await.unwrap());
        assert!(repo.exists_by_email("anna@example.com").await.unwrap());
        assert!(!repo.exists_by_email("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let repo = InMemoryUserRepository::new();
        repo.insert("chef_anna", "anna@example.com", "hash")
            .await
            .unwrap();

        let result = repo.insert("chef_anna", "other@example.com", "hash").await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert_eq!(repo.user_count().await, 1);
    }
}
