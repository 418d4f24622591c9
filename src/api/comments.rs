//! Comment API endpoints
//!
//! - POST /api/comment - Create comment (authenticated)
//! - GET /api/comment/post/{post_id} - Comments on a post, newest first
//! - PUT /api/comment/{id}/like - Toggle like (authenticated)
//! - PUT /api/comment/{id} - Edit comment (owner or admin)
//! - DELETE /api/comment/{id} - Delete comment (owner or admin)
//! - GET /api/comment - List all comments (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Comment, CommentWithMeta, CreateCommentInput, ListQuery};

/// Request body for editing a comment
#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    pub content: String,
}

/// Response for a like toggle
#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// Response for the admin comment listing
#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub total: i64,
    pub last_month: i64,
}

/// Response for the per-post comment listing
#[derive(Debug, Serialize)]
pub struct PostCommentsResponse {
    pub comments: Vec<CommentWithMeta>,
}

/// POST /api/comment - Create a comment
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCommentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state.comment_service.create(&user.0, body).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/comment/post/{post_id} - Comments on a post
///
/// Public; when the caller presents a valid token the response carries their
/// liked flags.
pub async fn get_post_comments(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostCommentsResponse>, ApiError> {
    let viewer_id = user.map(|u| u.0.id);

    let comments = state
        .comment_service
        .get_by_post(post_id, viewer_id)
        .await?;

    Ok(Json(PostCommentsResponse { comments }))
}

/// PUT /api/comment/{id}/like - Toggle a like
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<LikeResponse>, ApiError> {
    let (liked, like_count) = state.comment_service.toggle_like(&user.0, id).await?;

    Ok(Json(LikeResponse { liked, like_count }))
}

/// PUT /api/comment/{id} - Edit a comment (owner or admin)
pub async fn edit_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<EditCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .comment_service
        .edit(&user.0, id, &body.content)
        .await?;

    Ok(Json(comment))
}

/// DELETE /api/comment/{id} - Delete a comment (owner or admin)
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.comment_service.delete(&user.0, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/comment - List all comments (admin only)
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let page = state.comment_service.list(&query).await?;

    Ok(Json(CommentListResponse {
        comments: page.items,
        total: page.total,
        last_month: page.last_month,
    }))
}
