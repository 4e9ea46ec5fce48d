//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::fields::{strict_true, string_or_empty};
use crate::models::User;
use crate::services::Registration;

/// Register request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Username (unique)
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(example = "ada")]
    pub username: String,
    /// Plain text password, hashed before storage
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(example = "correct horse", format = "password")]
    pub password: String,
    /// Display name
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Only the JSON literal `true` grants admin
    #[serde(default, deserialize_with = "strict_true")]
    #[schema(example = false)]
    pub is_admin: bool,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            name: request.name,
            password: request.password,
            is_admin: request.is_admin,
        }
    }
}

/// Login request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(example = "ada")]
    pub username: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "Missing fields"))]
    #[schema(example = "correct horse", format = "password")]
    pub password: String,
}

/// Body of a successful registration
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    #[schema(example = true)]
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Who just logged in
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = false)]
    pub is_admin: bool,
}

impl From<User> for LoginResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            is_admin: user.is_admin,
        }
    }
}
