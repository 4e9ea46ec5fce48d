//! Repository layer for data access operations.

#[cfg(test)]
pub(crate) mod memory;
mod store;
mod user_repo;

pub use store::UserStore;
pub use user_repo::UserRepository;

use std::sync::Arc;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Repositories sit behind trait objects so tests can swap in an in-memory
/// store; cloning only bumps reference counts.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL through `pool`.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool)),
        }
    }

    /// Repositories backed by an arbitrary user store.
    pub fn with_user_store(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}
