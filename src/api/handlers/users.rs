//! User administration handlers.
//!
//! These endpoints are meant for administrators; the flag is stored but not
//! enforced here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{
    AddUserRequest, ChangePasswordRequest, DeleteUsersRequest, ErrorResponse, UserListItem,
};
use crate::api::middleware::duplicate_response;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Creates user-related routes.
///
/// Routes:
/// - GET /users                      - List all users
/// - POST /users                     - Add a user
/// - DELETE /users                   - Delete users by name
/// - PUT /users/{username}/password  - Change a password
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_users, add_user, delete_users))
        .routes(routes!(change_password))
}

/// GET /api/users - List all users ordered by username
#[utoipa::path(
    get,
    path = "/users",
    tag = USER_TAG,
    responses(
        (status = 200, description = "All users", body = Vec<UserListItem>),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserListItem>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserListItem::from).collect()))
}

/// POST /api/users - Add a user
#[utoipa::path(
    post,
    path = "/users",
    tag = USER_TAG,
    request_body = AddUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Missing fields or username exists", body = ErrorResponse)
    )
)]
async fn add_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddUserRequest>,
) -> Result<StatusCode, Response> {
    match state.services.users.register(payload.into()).await {
        Ok(_) => Ok(StatusCode::CREATED),
        Err(AppError::Duplicate { field, .. }) => Err(duplicate_response("Username exists", &field)),
        Err(e) => Err(e.into_response()),
    }
}

/// DELETE /api/users - Delete users by username
///
/// Names that do not exist are ignored.
#[utoipa::path(
    delete,
    path = "/users",
    tag = USER_TAG,
    request_body = DeleteUsersRequest,
    responses(
        (status = 204, description = "Named users deleted"),
        (status = 400, description = "No usernames provided", body = ErrorResponse)
    )
)]
async fn delete_users(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DeleteUsersRequest>,
) -> AppResult<StatusCode> {
    state.services.users.delete_users(&payload.usernames).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/users/{username}/password - Change a user's password
#[utoipa::path(
    put,
    path = "/users/{username}/password",
    tag = USER_TAG,
    params(("username" = String, Path, description = "Account to update")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Password required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn change_password(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .users
        .change_password(&username, payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
