//! Error response DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response format.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `VALIDATION_ERROR`
    #[schema(example = "UNAUTHORIZED")]
    pub code: String,
    /// Human-readable message
    #[schema(example = "Invalid credentials")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, error: &str) -> Self {
        Self {
            code: code.to_string(),
            error: error.to_string(),
            details: None,
        }
    }

    /// Adds details to the error response.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_omitted_when_absent() {
        let body = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "User not found")).unwrap();
        assert_eq!(body, json!({"code": "NOT_FOUND", "error": "User not found"}));
    }

    #[test]
    fn test_with_details() {
        let body = serde_json::to_value(
            ErrorResponse::new("DATABASE_ERROR", "Database operation failed")
                .with_details(json!({"operation": "insert user"})),
        )
        .unwrap();
        assert_eq!(body["details"]["operation"], "insert user");
    }
}
