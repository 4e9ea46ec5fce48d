//! Registration and login handlers.

use axum::{extract::State, Json};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    ErrorResponse, LoginRequest, LoginResponse, RegisterRequest, SuccessResponse,
};
use crate::api::middleware::limit_login_routes;
use crate::config::{ConfigError, RateLimitConfig};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Creates the authentication routes
///
/// # Routes
/// - `POST /register` - Create an account
/// - `POST /login` - Check credentials, rate limited per client
pub fn auth_routes(rate_limit: &RateLimitConfig) -> Result<OpenApiRouter<AppState>, ConfigError> {
    let login = limit_login_routes(OpenApiRouter::new().routes(routes!(login)), rate_limit)?;

    Ok(OpenApiRouter::new().routes(routes!(register)).merge(login))
}

/// POST /api/register - Register new user
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = SuccessResponse),
        (status = 400, description = "Missing fields or username already exists", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<SuccessResponse>> {
    state.services.users.register(payload.into()).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/login - Authenticate user
///
/// Reports who the user is; no session or token is issued.
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many login attempts", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state
        .services
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;

    tracing::info!(username = %user.username, "Login succeeded");
    Ok(Json(user.into()))
}
