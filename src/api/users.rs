//! User API endpoints
//!
//! - GET /api/user - List users (admin)
//! - GET /api/user/{id} - Public profile for comment author display
//! - PUT /api/user/{id} - Update own profile
//! - DELETE /api/user/{id} - Delete account (self or admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{ListQuery, UpdateUserInput};

/// Response for the admin user listing
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub last_month: i64,
}

/// Public view of a user (for comment author display)
#[derive(Debug, Serialize)]
pub struct PublicUserResponse {
    pub id: i64,
    pub username: String,
    pub profile_picture: String,
    pub created_at: String,
}

impl From<crate::models::User> for PublicUserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            profile_picture: user.profile_picture,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/user - List users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let page = state.user_service.list(&query).await?;

    Ok(Json(UserListResponse {
        users: page.items.into_iter().map(UserResponse::from).collect(),
        total: page.total,
        last_month: page.last_month,
    }))
}

/// GET /api/user/{id} - Public profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicUserResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

/// PUT /api/user/{id} - Update own profile
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserInput>,
) -> Result<Json<UserResponse>, ApiError> {
    if user.0.id != id {
        return Err(ApiError::forbidden("You can only update your own account"));
    }

    let updated = state.user_service.update(id, body).await?;

    Ok(Json(updated.into()))
}

/// DELETE /api/user/{id} - Delete account (self or admin)
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !user.0.can_modify(id) {
        return Err(ApiError::forbidden("You can only delete your own account"));
    }

    state.user_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
