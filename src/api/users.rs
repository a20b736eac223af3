//! User account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::UserResponse;
use crate::infrastructure::user::{CreateUserRequest, UpdatePasswordRequest};

/// Request body for POST /user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserDto {
    pub login: String,
    pub password: String,
}

/// Request body for PUT /user/{id}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordDto {
    pub old_password: String,
    pub new_password: String,
}

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

/// GET /user
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    debug!("Listing users");

    let users = state.user_service.get_all().await.map_err(ApiError::from)?;

    Ok(Json(users))
}

/// GET /user/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %id, "Getting user");

    let user = state.user_service.get_by_id(&id).await.map_err(ApiError::from)?;

    Ok(Json(user))
}

/// POST /user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserDto>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!(login = %request.login, "Creating user");

    let user = state
        .user_service
        .create(CreateUserRequest {
            login: request.login,
            password: request.password,
        })
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /user/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePasswordDto>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %id, "Rotating user password");

    let user = state
        .user_service
        .update(
            &id,
            UpdatePasswordRequest {
                old_password: request.old_password,
                new_password: request.new_password,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(user))
}

/// DELETE /user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(user_id = %id, "Deleting user");

    state.user_service.delete(&id).await.map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
