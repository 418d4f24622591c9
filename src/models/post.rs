//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - Input types for creating and updating posts
//! - `PostFilter` for list queries
//! - `slugify` deriving the URL slug from a title

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder image used when a post has none
pub const DEFAULT_POST_IMAGE: &str =
    "https://www.hostinger.com/tutorials/wp-content/uploads/sites/2/2021/09/how-to-write-a-blog-post.png";

/// Category applied when none is given
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique, derived from title)
    pub slug: String,
    /// Post title
    pub title: String,
    /// Post body (HTML from the editor)
    pub content: String,
    /// Cover image URL
    pub image: String,
    /// Category name
    pub category: String,
    /// Author user ID
    pub author_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with the given parameters
    pub fn new(title: String, content: String, author_id: i64) -> Self {
        let now = Utc::now();
        let slug = slugify(&title);
        Self {
            id: 0, // Will be set by the database
            slug,
            title,
            content,
            image: DEFAULT_POST_IMAGE.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            author_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Derive a URL slug from a title.
///
/// Lowercases, turns runs of whitespace into single dashes, and strips
/// everything that is not alphanumeric or a dash.
pub fn slugify(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Input for creating a new post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Cover image URL (optional)
    pub image: Option<String>,
    /// Category name (optional)
    pub category: Option<String>,
}

/// Input for updating a post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

/// Filters for the post listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    /// Only posts by this author
    pub author_id: Option<i64>,
    /// Only posts in this category
    pub category: Option<String>,
    /// Only the post with this slug
    pub slug: Option<String>,
    /// Only the post with this ID
    pub post_id: Option<i64>,
    /// Substring match against title or content
    pub search_term: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_new_derives_slug() {
        let post = Post::new("Hello World".to_string(), "body".to_string(), 1);
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.category, DEFAULT_CATEGORY);
        assert_eq!(post.image, DEFAULT_POST_IMAGE);
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("My First Post"), "my-first-post");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("What's new in Rust 1.75?"), "whats-new-in-rust-175");
        assert_eq!(slugify("C++ & Rust: a comparison"), "c--rust-a-comparison");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("  spaced   out  title "), "spaced-out-title");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }
}
