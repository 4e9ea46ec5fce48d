//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `auth` - registration and login
//! - `user` - user administration
//! - `health` - health check reports
//! - `error` - common error response

mod auth;
mod error;
mod fields;
mod health;
mod user;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest, SuccessResponse};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use user::{AddUserRequest, ChangePasswordRequest, DeleteUsersRequest, UserListItem};
