//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment with viewer-specific info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithMeta {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub like_count: i64,
    /// Whether the requesting user has liked this comment
    #[serde(default)]
    pub liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentWithMeta {
    /// Attach viewer info to a plain comment
    pub fn from_comment(comment: Comment, liked: bool) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            like_count: comment.like_count,
            liked,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// Input for creating a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentInput {
    pub post_id: i64,
    pub content: String,
}

/// Maximum comment length in characters
pub const MAX_COMMENT_LENGTH: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_comment_carries_fields() {
        let now = Utc::now();
        let comment = Comment {
            id: 3,
            post_id: 7,
            author_id: 11,
            content: "nice post".to_string(),
            like_count: 2,
            created_at: now,
            updated_at: now,
        };

        let meta = CommentWithMeta::from_comment(comment, true);
        assert_eq!(meta.id, 3);
        assert_eq!(meta.post_id, 7);
        assert_eq!(meta.like_count, 2);
        assert!(meta.liked);
    }
}
