//! Post API endpoints
//!
//! - GET /api/post - List posts with filters and pagination
//! - POST /api/post - Create post (admin)
//! - PUT /api/post/{id} - Update post (author or admin)
//! - DELETE /api/post/{id} - Delete post (author or admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreatePostInput, ListQuery, PostFilter, SortOrder, UpdatePostInput};

/// Query parameters for listing posts: pagination plus filters
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub start_index: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub order: SortOrder,
    pub author_id: Option<i64>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub post_id: Option<i64>,
    pub search_term: Option<String>,
}

fn default_limit() -> i64 {
    9
}

impl ListPostsQuery {
    fn split(self) -> (PostFilter, ListQuery) {
        (
            PostFilter {
                author_id: self.author_id,
                category: self.category,
                slug: self.slug,
                post_id: self.post_id,
                search_term: self.search_term,
            },
            ListQuery {
                start_index: self.start_index,
                limit: self.limit,
                order: self.order,
            },
        )
    }
}

/// Response for a single post
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub image: String,
    pub category: String,
    pub author_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::models::Post> for PostResponse {
    fn from(post: crate::models::Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            content: post.content,
            image: post.image,
            category: post.category,
            author_id: post.author_id,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// Response for the post listing
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub last_month: i64,
}

/// GET /api/post - List posts with filters
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let (filter, list_query) = query.split();

    let page = state.post_service.list(&filter, &list_query).await?;

    Ok(Json(PostListResponse {
        posts: page.items.into_iter().map(PostResponse::from).collect(),
        total: page.total,
        last_month: page.last_month,
    }))
}

/// POST /api/post - Create a post (admin only, enforced by router layer)
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.post_service.create(&user.0, body).await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// PUT /api/post/{id} - Update a post (author or admin)
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePostInput>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_service.update(&user.0, id, body).await?;

    Ok(Json(post.into()))
}

/// DELETE /api/post/{id} - Delete a post (author or admin)
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.post_service.delete(&user.0, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
