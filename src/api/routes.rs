//! Router configuration for the API.
//!
//! Centralizes route registration, OpenAPI collection and middleware.

use std::path::PathBuf;

use axum::{middleware, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::config::RateLimitConfig;
use crate::error::AppResult;
use crate::state::AppState;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Outermost first:
/// 1. Request ID - generates/propagates request IDs
/// 2. Logging - logs requests with request IDs
/// 3. Compression and CORS
/// 4. Global error handler - rewrites non-JSON error bodies
///
/// # Routes
/// - `/api/register`, `/api/login` (rate limited by `rate_limit`)
/// - `/api/users`, `/api/users/{username}/password`
/// - `/health`, `/health/ready`, `/health/live`
/// - `/docs` - Swagger UI
/// - anything else is looked up in `static_dir`, when set
///
/// The login limit keys clients by peer address, so serve with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Errors
///
/// `AppError::Configuration` when the rate limit describes no usable quota.
pub fn create_router(
    state: AppState,
    static_dir: Option<PathBuf>,
    rate_limit: &RateLimitConfig,
) -> AppResult<Router> {
    let api_routes = OpenApiRouter::new()
        .merge(handlers::auth::auth_routes(rate_limit)?)
        .merge(handlers::users::user_routes());

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api_routes)
        .merge(handlers::health::health_routes())
        .split_for_parts();

    let mut router = router.merge(SwaggerUi::new("/docs").url(OPENAPI_JSON_PATH, openapi));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    // Last added runs first
    Ok(router
        .layer(middleware::from_fn(global_error_handler))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state))
}
