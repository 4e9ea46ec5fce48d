//! Error handler for converting AppError to HTTP responses.
//!
//! Implements `IntoResponse` for `AppError` and a middleware that rewrites
//! framework-generated plain-text errors into the same JSON shape.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Upper bound on error bodies read back by [`global_error_handler`]
const MAX_ERROR_BODY: usize = 64 * 1024;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - Validation, ValidationErrors, BadRequest → 400
    /// - Duplicate → 400 (the account API reports taken usernames as bad input)
    /// - Unauthorized → 401
    /// - NotFound → 404
    /// - TooManyRequests → 429 with `Retry-After`
    /// - Database, Configuration, Internal → 500, detail logged only
    /// - ConnectionPool → 503
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::NotFound { entity, field, value } => {
                let message = match entity.as_str() {
                    "users" | "user" => "User not found".to_string(),
                    _ => format!("{} not found", entity),
                };
                tracing::debug!(entity = %entity, field = %field, value = %value, "Not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", &message),
                )
            }
            AppError::Duplicate { entity, field, .. } => {
                let message = match (entity.as_str(), field.as_str()) {
                    ("users", "username") => "Username already exists".to_string(),
                    _ => format!("{} already exists", field),
                };
                return duplicate_response(&message, field);
            }
            AppError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", reason)
                    .with_details(json!({ "field": field })),
            ),
            AppError::ValidationErrors { errors } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "VALIDATION_ERROR",
                    self.first_validation_message().unwrap_or("Validation failed"),
                )
                .with_details(json!({ "fields": errors })),
            ),
            AppError::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", message),
            ),
            AppError::Unauthorized { message } => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("UNAUTHORIZED", message),
            ),
            AppError::TooManyRequests { retry_after_secs } => {
                let body = ErrorResponse::new(
                    "TOO_MANY_REQUESTS",
                    "Too many login attempts, please try again later",
                )
                .with_details(json!({ "retry_after_secs": retry_after_secs }));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
                return response;
            }
            AppError::Database { operation, source } => {
                tracing::error!(operation = %operation, error = ?source, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "DATABASE_ERROR",
                        &format!("Database operation failed: {}", operation),
                    )
                    .with_details(json!({ "operation": operation })),
                )
            }
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = ?source, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("CONFIGURATION_ERROR", "Configuration error"),
                )
            }
            AppError::ConnectionPool { source } => {
                tracing::warn!(error = ?source, "Database connection unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable"),
                )
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// 400 `DUPLICATE_ENTRY` for a taken unique value.
///
/// Handlers whose clients expect different wording call this directly.
pub fn duplicate_response(message: &str, field: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("DUPLICATE_ENTRY", message).with_details(json!({ "field": field }))),
    )
        .into_response()
}

/// Global error handling middleware.
///
/// Error responses that are not already JSON (routing 404s, 405s, extractor
/// rejections, empty static-file misses) are rewritten into `ErrorResponse`.
/// Headers such as `Allow` are kept. Plain 429s from the login rate limit
/// become `TOO_MANY_REQUESTS` with a `Retry-After` header.
pub async fn global_error_handler(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return AppError::TooManyRequests {
            retry_after_secs: retry_after_secs(response.headers()),
        }
        .into_response();
    }

    let (mut parts, body) = response.into_parts();
    let original_message = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let (code, default_message) = describe_status(status);
    let message = if original_message.is_empty() || status.is_server_error() {
        default_message.to_string()
    } else {
        original_message
    };

    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);

    let mut rewritten = (status, Json(ErrorResponse::new(code, &message))).into_response();
    for (name, value) in parts.headers.iter() {
        rewritten.headers_mut().insert(name.clone(), value.clone());
    }
    rewritten
}

/// Whole seconds a limited client should wait, at least one.
///
/// Reads `Retry-After`, then governor's `x-ratelimit-after`.
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    ["retry-after", "x-ratelimit-after"]
        .into_iter()
        .find_map(|name| headers.get(name)?.to_str().ok()?.trim().parse::<u64>().ok())
        .unwrap_or(1)
        .max(1)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

fn describe_status(status: StatusCode) -> (&'static str, &'static str) {
    match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        s if s.is_server_error() => ("INTERNAL_ERROR", "An internal server error occurred"),
        _ => ("ERROR", "Request failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_400() {
        let response = AppError::Duplicate {
            entity: "users".into(),
            field: "username".into(),
            value: "ada".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DUPLICATE_ENTRY");
        assert_eq!(body["error"], "Username already exists");
    }

    #[tokio::test]
    async fn test_validation_errors_use_first_message() {
        let response = AppError::ValidationErrors {
            errors: vec![crate::error::ValidationFieldError {
                field: "usernames".into(),
                message: "No usernames provided".into(),
            }],
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "No usernames provided");
        assert_eq!(body["details"]["fields"][0]["field"], "usernames");
    }

    #[tokio::test]
    async fn test_not_found_user() {
        let response = AppError::NotFound {
            entity: "users".into(),
            field: "username".into(),
            value: "ghost".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "User not found");
    }

    #[tokio::test]
    async fn test_too_many_requests_sets_retry_after() {
        let response = AppError::TooManyRequests {
            retry_after_secs: 30,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }

    #[tokio::test]
    async fn test_database_error_hides_source() {
        let response = AppError::Database {
            operation: "insert user".into(),
            source: anyhow::anyhow!("password authentication failed for user postgres"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert!(!body.to_string().contains("postgres"));
    }

    #[tokio::test]
    async fn test_pool_error_is_503() {
        let response = AppError::ConnectionPool {
            source: anyhow::anyhow!("timed out"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_retry_after_secs_reads_governor_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), 1);

        headers.insert("x-ratelimit-after", HeaderValue::from_static("12"));
        assert_eq!(retry_after_secs(&headers), 12);

        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("0"));
        assert_eq!(retry_after_secs(&headers), 1);
    }

    #[tokio::test]
    async fn test_plain_429_is_rewritten() {
        let app = axum::Router::new()
            .route(
                "/limited",
                axum::routing::get(|| async {
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [("x-ratelimit-after", "7")],
                        "Too Many Requests! Wait for 7s",
                    )
                }),
            )
            .layer(axum::middleware::from_fn(global_error_handler));

        let response = tower::ServiceExt::oneshot(
            app,
            axum::extract::Request::builder()
                .uri("/limited")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
        assert_eq!(body_json(response).await["code"], "TOO_MANY_REQUESTS");
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(StatusCode::NOT_FOUND).0, "NOT_FOUND");
        assert_eq!(describe_status(StatusCode::BAD_GATEWAY).0, "INTERNAL_ERROR");
        assert_eq!(describe_status(StatusCode::IM_A_TEAPOT).0, "ERROR");
    }
}
