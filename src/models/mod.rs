//! Domain models
//!
//! Entities and input types shared between the service and database layers.

pub mod comment;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentWithMeta, CreateCommentInput};
pub use post::{CreatePostInput, Post, PostFilter, UpdatePostInput};
pub use user::{UpdateUserInput, User};

use serde::{Deserialize, Serialize};

/// Sort order for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this order
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

/// Offset-based listing parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListQuery {
    /// Offset into the result set
    #[serde(default)]
    pub start_index: i64,
    /// Maximum number of items to return
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Sort order by timestamp
    #[serde(default)]
    pub order: SortOrder,
}

fn default_limit() -> i64 {
    9
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            start_index: 0,
            limit: default_limit(),
            order: SortOrder::Desc,
        }
    }
}

impl ListQuery {
    /// Clamp the query to sane bounds
    pub fn clamped(self) -> Self {
        Self {
            start_index: self.start_index.max(0),
            limit: self.limit.clamp(1, 100),
            order: self.order,
        }
    }
}

/// A page of results with the dashboard counters
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total rows matching the filter
    pub total: i64,
    /// Rows created in the trailing 30 days
    pub last_month: i64,
}
