//! Storage seam for user accounts.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewUser, User, UserSummary};

/// Persistence operations the account service needs.
///
/// Each method maps to a single SQL statement against `users`. Implementations
/// must report a taken username as `AppError::Duplicate`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a row; the unique username constraint is enforced here.
    async fn insert(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Every user ordered by username ascending, without hashes.
    async fn list_ordered(&self) -> AppResult<Vec<UserSummary>>;

    /// Delete the rows whose username is in `usernames`; returns the number removed.
    async fn delete_by_usernames(&self, usernames: &[String]) -> AppResult<usize>;

    /// Replace the hash of one user; returns the number of rows updated (0 or 1).
    async fn update_hash(&self, username: &str, hash: &str) -> AppResult<usize>;

    /// Cheap round-trip used by readiness probes.
    async fn ping(&self) -> AppResult<()>;
}
