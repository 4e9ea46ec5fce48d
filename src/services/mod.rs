//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod user_service;

pub use user_service::{INVALID_CREDENTIALS, Registration, UserService};

use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Designed to live inside Axum application state; cloning is cheap.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories) -> Self {
        Self {
            users: UserService::new(repos.users),
        }
    }
}
