//! Comment service

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{
    comment::MAX_COMMENT_LENGTH, Comment, CommentWithMeta, CreateCommentInput, ListQuery, Page,
    User,
};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Comment not found
    #[error("Comment not found")]
    NotFound,

    /// Post being commented on does not exist
    #[error("Post not found")]
    PostNotFound,

    /// Caller may not modify this comment
    #[error("You can only modify your own comments")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { repo, post_repo }
    }

    /// Create a comment by `author` on an existing post
    pub async fn create(
        &self,
        author: &User,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        validate_content(&input.content)?;

        if self
            .post_repo
            .get_by_id(input.post_id)
            .await
            .context("Failed to check post")?
            .is_none()
        {
            return Err(CommentServiceError::PostNotFound);
        }

        let now = Utc::now();
        let comment = Comment {
            id: 0,
            post_id: input.post_id,
            author_id: author.id,
            content: input.content.trim().to_string(),
            like_count: 0,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repo
            .create(&comment)
            .await
            .context("Failed to create comment")?;

        Ok(created)
    }

    /// Get the comments on a post, newest first, with the viewer's liked
    /// flags when a viewer is known.
    pub async fn get_by_post(
        &self,
        post_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Vec<CommentWithMeta>, CommentServiceError> {
        let comments = self
            .repo
            .get_by_post(post_id)
            .await
            .context("Failed to load comments")?;

        let liked = match viewer_id {
            Some(user_id) => self
                .repo
                .liked_comment_ids(post_id, user_id)
                .await
                .context("Failed to load likes")?,
            None => Default::default(),
        };

        Ok(comments
            .into_iter()
            .map(|c| {
                let is_liked = liked.contains(&c.id);
                CommentWithMeta::from_comment(c, is_liked)
            })
            .collect())
    }

    /// Toggle the caller's like on a comment.
    ///
    /// Returns the new liked state and like count.
    pub async fn toggle_like(
        &self,
        user: &User,
        comment_id: i64,
    ) -> Result<(bool, i64), CommentServiceError> {
        if self
            .repo
            .get_by_id(comment_id)
            .await
            .context("Failed to load comment")?
            .is_none()
        {
            return Err(CommentServiceError::NotFound);
        }

        let liked = if self
            .repo
            .is_liked(comment_id, user.id)
            .await
            .context("Failed to check like")?
        {
            self.repo
                .remove_like(comment_id, user.id)
                .await
                .context("Failed to remove like")?;
            false
        } else {
            self.repo
                .add_like(comment_id, user.id)
                .await
                .context("Failed to add like")?;
            true
        };

        let like_count = self
            .repo
            .get_by_id(comment_id)
            .await
            .context("Failed to reload comment")?
            .map(|c| c.like_count)
            .unwrap_or(0);

        Ok((liked, like_count))
    }

    /// Edit a comment's content. The caller must own it or be an admin.
    pub async fn edit(
        &self,
        actor: &User,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, CommentServiceError> {
        validate_content(content)?;

        let comment = self
            .repo
            .get_by_id(comment_id)
            .await
            .context("Failed to load comment")?
            .ok_or(CommentServiceError::NotFound)?;

        if !actor.can_modify(comment.author_id) {
            return Err(CommentServiceError::Forbidden);
        }

        let updated = self
            .repo
            .update_content(comment_id, content.trim())
            .await
            .context("Failed to update comment")?;

        Ok(updated)
    }

    /// Delete a comment. The caller must own it or be an admin.
    pub async fn delete(&self, actor: &User, comment_id: i64) -> Result<(), CommentServiceError> {
        let comment = self
            .repo
            .get_by_id(comment_id)
            .await
            .context("Failed to load comment")?
            .ok_or(CommentServiceError::NotFound)?;

        if !actor.can_modify(comment.author_id) {
            return Err(CommentServiceError::Forbidden);
        }

        self.repo
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;

        Ok(())
    }

    /// List comments across all posts for the admin dashboard
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Comment>, CommentServiceError> {
        let query = query.clamped();

        let items = self
            .repo
            .list(query.start_index, query.limit, query.order)
            .await
            .context("Failed to list comments")?;

        let total = self
            .repo
            .count()
            .await
            .context("Failed to count comments")?;

        let month_ago = Utc::now() - Duration::days(30);
        let last_month = self
            .repo
            .count_since(month_ago)
            .await
            .context("Failed to count recent comments")?;

        Ok(Page {
            items,
            total,
            last_month,
        })
    }
}

fn validate_content(content: &str) -> Result<(), CommentServiceError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CommentServiceError::ValidationError(
            "Content is required".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CommentServiceError::ValidationError(format!(
            "Comments are limited to {} characters",
            MAX_COMMENT_LENGTH
        )));
    }
    Ok(())
}
