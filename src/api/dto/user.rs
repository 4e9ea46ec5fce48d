//! User-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::fields::{strict_true, string_list_or_empty, string_or_empty};
use crate::models::UserSummary;
use crate::services::Registration;

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a user from the admin screen.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddUserRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(example = "grace")]
    pub username: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(example = "Grace Hopper")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(format = "password")]
    pub password: String,
    /// Only the JSON literal `true` grants admin
    #[serde(default, deserialize_with = "strict_true")]
    pub admin: bool,
}

impl From<AddUserRequest> for Registration {
    fn from(request: AddUserRequest) -> Self {
        Self {
            username: request.username,
            name: request.name,
            password: request.password,
            is_admin: request.admin,
        }
    }
}

/// Request body for bulk deletion.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DeleteUsersRequest {
    #[serde(default, deserialize_with = "string_list_or_empty")]
    #[validate(length(min = 1, message = "No usernames provided"))]
    #[schema(example = json!(["grace", "linus"]))]
    pub usernames: Vec<String>,
}

/// Request body for a password change.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Password required"))]
    #[schema(format = "password")]
    pub password: String,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// One row of the user list; never carries the hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListItem {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub admin: bool,
}

impl From<UserSummary> for UserListItem {
    fn from(user: UserSummary) -> Self {
        Self {
            username: user.username,
            name: user.name,
            admin: user.is_admin,
        }
    }
}
