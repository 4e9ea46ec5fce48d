//! User service for business logic operations.
//!
//! Owns password hashing and the rules that sit between the HTTP layer and
//! the `users` table.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserSummary};
use crate::repositories::UserStore;
use crate::utils::password::{hash_password, verify_password};

/// Message returned for both unknown users and wrong passwords
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Fields needed to create an account, before hashing
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub password: String,
    pub is_admin: bool,
}

/// User service for handling user-related business logic.
///
/// Cloning only bumps the reference count of the underlying store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Hashes the password and inserts the account.
    ///
    /// A taken username surfaces as `AppError::Duplicate` from the store.
    pub async fn register(&self, registration: Registration) -> AppResult<User> {
        let hash = hash_blocking(registration.password).await?;
        let user = self
            .store
            .insert(NewUser {
                username: registration.username,
                name: registration.name,
                hash,
                is_admin: registration.is_admin,
            })
            .await?;

        tracing::info!(username = %user.username, is_admin = user.is_admin, "User created");
        Ok(user)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown users and wrong passwords produce the same `Unauthorized` error.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.store.find_by_username(username).await? else {
            tracing::debug!(username = %username, "Login for unknown user");
            return Err(invalid_credentials());
        };

        let password = password.to_string();
        let hash = user.hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })??;

        if !matches {
            tracing::debug!(username = %username, "Login with wrong password");
            return Err(invalid_credentials());
        }

        Ok(user)
    }

    /// Every user ordered by username, without hashes.
    pub async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        self.store.list_ordered().await
    }

    /// Deletes exactly the named users; unknown names are ignored.
    ///
    /// Returns how many rows were removed.
    pub async fn delete_users(&self, usernames: &[String]) -> AppResult<usize> {
        let deleted = self.store.delete_by_usernames(usernames).await?;
        tracing::info!(requested = usernames.len(), deleted, "Users deleted");
        Ok(deleted)
    }

    /// Replaces the stored hash of `username` with a hash of `new_password`.
    pub async fn change_password(&self, username: &str, new_password: String) -> AppResult<()> {
        let hash = hash_blocking(new_password).await?;
        let updated = self.store.update_hash(username, &hash).await?;

        if updated == 0 {
            return Err(AppError::NotFound {
                entity: "users".to_string(),
                field: "username".to_string(),
                value: username.to_string(),
            });
        }

        tracing::info!(username = %username, "Password changed");
        Ok(())
    }

    /// Store round-trip for readiness checks.
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized {
        message: INVALID_CREDENTIALS.to_string(),
    }
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?
}
