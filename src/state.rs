//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::db::AsyncDbPool;
use crate::repositories::{Repositories, UserStore};
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    pub version: &'static str,
}

impl AppState {
    /// Creates a new AppState backed by PostgreSQL.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(pool);
    /// ```
    pub fn new(pool: AsyncDbPool) -> Self {
        Self::from_repositories(Repositories::new(pool))
    }

    /// Creates an AppState over any user store.
    pub fn with_user_store(store: Arc<dyn UserStore>) -> Self {
        Self::from_repositories(Repositories::with_user_store(store))
    }

    fn from_repositories(repos: Repositories) -> Self {
        Self {
            services: Services::new(repos),
            version: crate::pkg_version(),
        }
    }
}
