//! Comment repository
//!
//! Database operations for comments and comment likes. Likes are stored as
//! one row per (comment, user); `like_count` on the comment row is kept in
//! step by only adjusting it when a like row was actually inserted or
//! removed, so repeated requests cannot skew the counter.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, SortOrder};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashSet;
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get all comments on a post, newest first
    async fn get_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Update a comment's content, returning the stored row
    async fn update_content(&self, id: i64, content: &str) -> Result<Comment>;

    /// Delete a comment; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Add a like; returns false if the user had already liked the comment
    async fn add_like(&self, comment_id: i64, user_id: i64) -> Result<bool>;

    /// Remove a like; returns false if there was none
    async fn remove_like(&self, comment_id: i64, user_id: i64) -> Result<bool>;

    /// Check whether the user has liked the comment
    async fn is_liked(&self, comment_id: i64, user_id: i64) -> Result<bool>;

    /// IDs of the comments on a post that the user has liked
    async fn liked_comment_ids(&self, post_id: i64, user_id: i64) -> Result<HashSet<i64>>;

    /// List comments across all posts sorted by creation time
    async fn list(&self, start_index: i64, limit: i64, order: SortOrder) -> Result<Vec<Comment>>;

    /// Count total comments
    async fn count(&self) -> Result<i64>;

    /// Count comments created after the given instant
    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_comment_sqlite(self.pool.as_sqlite().unwrap(), comment).await
            }
            DatabaseDriver::Mysql => {
                create_comment_mysql(self.pool.as_mysql().unwrap(), comment).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_comment_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_comment_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_comments_by_post_sqlite(self.pool.as_sqlite().unwrap(), post_id).await
            }
            DatabaseDriver::Mysql => {
                get_comments_by_post_mysql(self.pool.as_mysql().unwrap(), post_id).await
            }
        }
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_comment_sqlite(self.pool.as_sqlite().unwrap(), id, content).await
            }
            DatabaseDriver::Mysql => {
                update_comment_mysql(self.pool.as_mysql().unwrap(), id, content).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_comment_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_comment_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn add_like(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_like_sqlite(self.pool.as_sqlite().unwrap(), comment_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                add_like_mysql(self.pool.as_mysql().unwrap(), comment_id, user_id).await
            }
        }
    }

    async fn remove_like(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                remove_like_sqlite(self.pool.as_sqlite().unwrap(), comment_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                remove_like_mysql(self.pool.as_mysql().unwrap(), comment_id, user_id).await
            }
        }
    }

    async fn is_liked(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                is_liked_sqlite(self.pool.as_sqlite().unwrap(), comment_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                is_liked_mysql(self.pool.as_mysql().unwrap(), comment_id, user_id).await
            }
        }
    }

    async fn liked_comment_ids(&self, post_id: i64, user_id: i64) -> Result<HashSet<i64>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                liked_comment_ids_sqlite(self.pool.as_sqlite().unwrap(), post_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                liked_comment_ids_mysql(self.pool.as_mysql().unwrap(), post_id, user_id).await
            }
        }
    }

    async fn list(&self, start_index: i64, limit: i64, order: SortOrder) -> Result<Vec<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_sqlite(self.pool.as_sqlite().unwrap(), start_index, limit, order)
                    .await
            }
            DatabaseDriver::Mysql => {
                list_comments_mysql(self.pool.as_mysql().unwrap(), start_index, limit, order).await
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_comments_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_comments_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_comments_since_sqlite(self.pool.as_sqlite().unwrap(), since).await
            }
            DatabaseDriver::Mysql => {
                count_comments_since_mysql(self.pool.as_mysql().unwrap(), since).await
            }
        }
    }
}

const COMMENT_COLUMNS: &str =
    "id, post_id, author_id, content, like_count, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO comments (post_id, author_id, content, like_count, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(&comment.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    let id = result.last_insert_rowid();

    Ok(Comment {
        id,
        like_count: 0,
        created_at: now,
        updated_at: now,
        ..comment.clone()
    })
}

async fn get_comment_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_comment_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_comments_by_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments WHERE post_id = ? ORDER BY created_at DESC, id DESC",
        COMMENT_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to get comments for post")?;

    let mut comments = Vec::new();
    for row in rows {
        comments.push(row_to_comment_sqlite(&row)?);
    }

    Ok(comments)
}

async fn update_comment_sqlite(pool: &SqlitePool, id: i64, content: &str) -> Result<Comment> {
    let now = Utc::now();

    sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_comment_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_comment_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

async fn add_like_sqlite(pool: &SqlitePool, comment_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO comment_likes (comment_id, user_id) VALUES (?, ?)",
    )
    .bind(comment_id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to add like")?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE comments SET like_count = like_count + 1 WHERE id = ?")
        .bind(comment_id)
        .execute(pool)
        .await
        .context("Failed to bump like count")?;

    Ok(true)
}

async fn remove_like_sqlite(pool: &SqlitePool, comment_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comment_likes WHERE comment_id = ? AND user_id = ?")
        .bind(comment_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to remove like")?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE comments SET like_count = MAX(like_count - 1, 0) WHERE id = ?")
        .bind(comment_id)
        .execute(pool)
        .await
        .context("Failed to drop like count")?;

    Ok(true)
}

async fn is_liked_sqlite(pool: &SqlitePool, comment_id: i64, user_id: i64) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM comment_likes WHERE comment_id = ? AND user_id = ?",
    )
    .bind(comment_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to check like")?;

    Ok(count > 0)
}

async fn liked_comment_ids_sqlite(
    pool: &SqlitePool,
    post_id: i64,
    user_id: i64,
) -> Result<HashSet<i64>> {
    let rows = sqlx::query(
        r#"
        SELECT cl.comment_id FROM comment_likes cl
        JOIN comments c ON c.id = cl.comment_id
        WHERE c.post_id = ? AND cl.user_id = ?
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to load liked comments")?;

    Ok(rows.iter().map(|row| row.get("comment_id")).collect())
}

async fn list_comments_sqlite(
    pool: &SqlitePool,
    start_index: i64,
    limit: i64,
    order: SortOrder,
) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments ORDER BY created_at {} LIMIT ? OFFSET ?",
        COMMENT_COLUMNS,
        order.as_sql()
    );

    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(start_index)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    let mut comments = Vec::new();
    for row in rows {
        comments.push(row_to_comment_sqlite(&row)?);
    }

    Ok(comments)
}

async fn count_comments_sqlite(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;

    Ok(count)
}

async fn count_comments_since_sqlite(pool: &SqlitePool, since: DateTime<Utc>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE created_at > ?")
        .bind(since)
        .fetch_one(pool)
        .await
        .context("Failed to count recent comments")?;

    Ok(count)
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        like_count: row.get("like_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(pool: &MySqlPool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO comments (post_id, author_id, content, like_count, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(&comment.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    let id = result.last_insert_id() as i64;

    Ok(Comment {
        id,
        like_count: 0,
        created_at: now,
        updated_at: now,
        ..comment.clone()
    })
}

async fn get_comment_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_comment_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_comments_by_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments WHERE post_id = ? ORDER BY created_at DESC, id DESC",
        COMMENT_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to get comments for post")?;

    let mut comments = Vec::new();
    for row in rows {
        comments.push(row_to_comment_mysql(&row)?);
    }

    Ok(comments)
}

async fn update_comment_mysql(pool: &MySqlPool, id: i64, content: &str) -> Result<Comment> {
    let now = Utc::now();

    sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_comment_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_comment_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

async fn add_like_mysql(pool: &MySqlPool, comment_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "INSERT IGNORE INTO comment_likes (comment_id, user_id) VALUES (?, ?)",
    )
    .bind(comment_id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to add like")?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE comments SET like_count = like_count + 1 WHERE id = ?")
        .bind(comment_id)
        .execute(pool)
        .await
        .context("Failed to bump like count")?;

    Ok(true)
}

async fn remove_like_mysql(pool: &MySqlPool, comment_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comment_likes WHERE comment_id = ? AND user_id = ?")
        .bind(comment_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to remove like")?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE comments SET like_count = GREATEST(like_count - 1, 0) WHERE id = ?")
        .bind(comment_id)
        .execute(pool)
        .await
        .context("Failed to drop like count")?;

    Ok(true)
}

async fn is_liked_mysql(pool: &MySqlPool, comment_id: i64, user_id: i64) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM comment_likes WHERE comment_id = ? AND user_id = ?",
    )
    .bind(comment_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to check like")?;

    Ok(count > 0)
}

async fn liked_comment_ids_mysql(
    pool: &MySqlPool,
    post_id: i64,
    user_id: i64,
) -> Result<HashSet<i64>> {
    let rows = sqlx::query(
        r#"
        SELECT cl.comment_id FROM comment_likes cl
        JOIN comments c ON c.id = cl.comment_id
        WHERE c.post_id = ? AND cl.user_id = ?
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to load liked comments")?;

    Ok(rows.iter().map(|row| row.get("comment_id")).collect())
}

async fn list_comments_mysql(
    pool: &MySqlPool,
    start_index: i64,
    limit: i64,
    order: SortOrder,
) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments ORDER BY created_at {} LIMIT ? OFFSET ?",
        COMMENT_COLUMNS,
        order.as_sql()
    );

    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(start_index)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    let mut comments = Vec::new();
    for row in rows {
        comments.push(row_to_comment_mysql(&row)?);
    }

    Ok(comments)
}

async fn count_comments_mysql(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;

    Ok(count)
}

async fn count_comments_since_mysql(pool: &MySqlPool, since: DateTime<Utc>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE created_at > ?")
        .bind(since)
        .fetch_one(pool)
        .await
        .context("Failed to count recent comments")?;

    Ok(count)
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Comment> {
    Ok(Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        like_count: row.get("like_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, SqlxPostRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Post, User};

    struct Fixture {
        comments: SqlxCommentRepository,
        posts: SqlxPostRepository,
        user_id: i64,
        other_user_id: i64,
        post_id: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "commenter".to_string(),
                "commenter@example.com".to_string(),
                "hash".to_string(),
                false,
            ))
            .await
            .unwrap();
        let other = users
            .create(&User::new(
                "other".to_string(),
                "other@example.com".to_string(),
                "hash".to_string(),
                false,
            ))
            .await
            .unwrap();

        let posts = SqlxPostRepository::new(pool.clone());
        let post = posts
            .create(&Post::new("A Post".to_string(), "body".to_string(), user.id))
            .await
            .unwrap();

        Fixture {
            comments: SqlxCommentRepository::new(pool.clone()),
            posts,
            user_id: user.id,
            other_user_id: other.id,
            post_id: post.id,
        }
    }

    fn sample_comment(post_id: i64, author_id: i64, content: &str) -> Comment {
        Comment {
            id: 0,
            post_id,
            author_id,
            content: content.to_string(),
            like_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let fx = setup().await;

        let created = fx
            .comments
            .create(&sample_comment(fx.post_id, fx.user_id, "first!"))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.like_count, 0);

        let fetched = fx.comments.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "first!");
    }

    #[tokio::test]
    async fn test_get_by_post_newest_first() {
        let fx = setup().await;

        for content in ["one", "two", "three"] {
            fx.comments
                .create(&sample_comment(fx.post_id, fx.user_id, content))
                .await
                .unwrap();
        }

        let comments = fx.comments.get_by_post(fx.post_id).await.unwrap();
        assert_eq!(comments.len(), 3);
        // Ties on created_at fall back to id, so insertion order is reversed
        assert_eq!(comments[0].content, "three");
        assert_eq!(comments[2].content, "one");
    }

    #[tokio::test]
    async fn test_update_content() {
        let fx = setup().await;
        let comment = fx
            .comments
            .create(&sample_comment(fx.post_id, fx.user_id, "typo"))
            .await
            .unwrap();

        let updated = fx
            .comments
            .update_content(comment.id, "fixed")
            .await
            .unwrap();
        assert_eq!(updated.content, "fixed");
    }

    #[tokio::test]
    async fn test_delete() {
        let fx = setup().await;
        let comment = fx
            .comments
            .create(&sample_comment(fx.post_id, fx.user_id, "gone soon"))
            .await
            .unwrap();

        assert!(fx.comments.delete(comment.id).await.unwrap());
        assert!(fx.comments.get_by_id(comment.id).await.unwrap().is_none());
        assert!(!fx.comments.delete(comment.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_like_toggle_keeps_count_in_step() {
        let fx = setup().await;
        let comment = fx
            .comments
            .create(&sample_comment(fx.post_id, fx.user_id, "like me"))
            .await
            .unwrap();

        // First like counts
        assert!(fx.comments.add_like(comment.id, fx.user_id).await.unwrap());
        // Second like from the same user is a no-op
        assert!(!fx.comments.add_like(comment.id, fx.user_id).await.unwrap());

        let fetched = fx.comments.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(fetched.like_count, 1);
        assert!(fx.comments.is_liked(comment.id, fx.user_id).await.unwrap());

        // A different user adds a second like
        assert!(fx
            .comments
            .add_like(comment.id, fx.other_user_id)
            .await
            .unwrap());
        let fetched = fx.comments.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(fetched.like_count, 2);

        // Unlike drops back to one; repeating is a no-op
        assert!(fx
            .comments
            .remove_like(comment.id, fx.user_id)
            .await
            .unwrap());
        assert!(!fx
            .comments
            .remove_like(comment.id, fx.user_id)
            .await
            .unwrap());

        let fetched = fx.comments.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(fetched.like_count, 1);
        assert!(!fx.comments.is_liked(comment.id, fx.user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_liked_comment_ids() {
        let fx = setup().await;
        let liked = fx
            .comments
            .create(&sample_comment(fx.post_id, fx.user_id, "liked"))
            .await
            .unwrap();
        let unliked = fx
            .comments
            .create(&sample_comment(fx.post_id, fx.user_id, "not liked"))
            .await
            .unwrap();

        fx.comments.add_like(liked.id, fx.user_id).await.unwrap();

        let ids = fx
            .comments
            .liked_comment_ids(fx.post_id, fx.user_id)
            .await
            .unwrap();
        assert!(ids.contains(&liked.id));
        assert!(!ids.contains(&unliked.id));
    }

    #[tokio::test]
    async fn test_list_and_counts() {
        let fx = setup().await;
        for content in ["a", "b", "c"] {
            fx.comments
                .create(&sample_comment(fx.post_id, fx.user_id, content))
                .await
                .unwrap();
        }

        assert_eq!(fx.comments.count().await.unwrap(), 3);

        let page = fx.comments.list(0, 2, SortOrder::Desc).await.unwrap();
        assert_eq!(page.len(), 2);

        let month_ago = Utc::now() - chrono::Duration::days(30);
        assert_eq!(fx.comments.count_since(month_ago).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_deleting_post_cascades_comments() {
        let fx = setup().await;
        let comment = fx
            .comments
            .create(&sample_comment(fx.post_id, fx.user_id, "orphan?"))
            .await
            .unwrap();

        assert!(fx.posts.delete(fx.post_id).await.unwrap());

        let fetched = fx.comments.get_by_id(comment.id).await.unwrap();
        assert!(fetched.is_none());
    }
}
