//! Post repository
//!
//! Database operations for posts, including the filtered listing that backs
//! the public post feed (category, author, slug, and search filters with
//! offset pagination).

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ListQuery, Post, PostFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Update a post, returning the stored row
    async fn update(&self, post: &Post) -> Result<Post>;

    /// Delete a post; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// List posts matching the filter, with the total matching count
    async fn list(&self, filter: &PostFilter, query: &ListQuery) -> Result<(Vec<Post>, i64)>;

    /// Count posts created after the given instant
    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.as_sqlite().unwrap(), post).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.as_mysql().unwrap(), post).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_post_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_post_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => {
                get_post_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await
            }
        }
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_post_sqlite(self.pool.as_sqlite().unwrap(), post).await,
            DatabaseDriver::Mysql => update_post_mysql(self.pool.as_mysql().unwrap(), post).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, filter: &PostFilter, query: &ListQuery) -> Result<(Vec<Post>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_posts_sqlite(self.pool.as_sqlite().unwrap(), filter, query).await
            }
            DatabaseDriver::Mysql => {
                list_posts_mysql(self.pool.as_mysql().unwrap(), filter, query).await
            }
        }
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_posts_since_sqlite(self.pool.as_sqlite().unwrap(), since).await
            }
            DatabaseDriver::Mysql => {
                count_posts_since_mysql(self.pool.as_mysql().unwrap(), since).await
            }
        }
    }
}

const POST_COLUMNS: &str =
    "id, slug, title, content, image, category, author_id, created_at, updated_at";

/// Build the WHERE clause for a post filter.
///
/// Placeholders are `?` for both drivers; the caller binds values in the
/// same order the conditions are appended here.
fn filter_where_clause(filter: &PostFilter) -> String {
    let mut clause = String::from("WHERE 1=1");
    if filter.author_id.is_some() {
        clause.push_str(" AND author_id = ?");
    }
    if filter.category.is_some() {
        clause.push_str(" AND category = ?");
    }
    if filter.slug.is_some() {
        clause.push_str(" AND slug = ?");
    }
    if filter.post_id.is_some() {
        clause.push_str(" AND id = ?");
    }
    if filter.search_term.is_some() {
        clause.push_str(" AND (title LIKE ? OR content LIKE ?)");
    }
    clause
}

fn search_pattern(term: &str) -> String {
    format!("%{}%", term)
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (slug, title, content, image, category, author_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.category)
    .bind(post.author_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_rowid();

    Ok(Post {
        id,
        created_at: now,
        updated_at: now,
        ..post.clone()
    })
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_post_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn update_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE posts
        SET slug = ?, title = ?, content = ?, image = ?, category = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.category)
    .bind(now)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_sqlite(pool, post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

async fn list_posts_sqlite(
    pool: &SqlitePool,
    filter: &PostFilter,
    query: &ListQuery,
) -> Result<(Vec<Post>, i64)> {
    let where_clause = filter_where_clause(filter);

    let list_sql = format!(
        "SELECT {} FROM posts {} ORDER BY updated_at {} LIMIT ? OFFSET ?",
        POST_COLUMNS,
        where_clause,
        query.order.as_sql()
    );

    let mut list_query = sqlx::query(&list_sql);
    if let Some(author_id) = filter.author_id {
        list_query = list_query.bind(author_id);
    }
    if let Some(ref category) = filter.category {
        list_query = list_query.bind(category);
    }
    if let Some(ref slug) = filter.slug {
        list_query = list_query.bind(slug);
    }
    if let Some(post_id) = filter.post_id {
        list_query = list_query.bind(post_id);
    }
    if let Some(ref term) = filter.search_term {
        let pattern = search_pattern(term);
        list_query = list_query.bind(pattern.clone()).bind(pattern);
    }
    let rows = list_query
        .bind(query.limit)
        .bind(query.start_index)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row_to_post_sqlite(&row)?);
    }

    let count_sql = format!("SELECT COUNT(*) FROM posts {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(author_id) = filter.author_id {
        count_query = count_query.bind(author_id);
    }
    if let Some(ref category) = filter.category {
        count_query = count_query.bind(category);
    }
    if let Some(ref slug) = filter.slug {
        count_query = count_query.bind(slug);
    }
    if let Some(post_id) = filter.post_id {
        count_query = count_query.bind(post_id);
    }
    if let Some(ref term) = filter.search_term {
        let pattern = search_pattern(term);
        count_query = count_query.bind(pattern.clone()).bind(pattern);
    }
    let total = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok((posts, total))
}

async fn count_posts_since_sqlite(pool: &SqlitePool, since: DateTime<Utc>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE created_at > ?")
        .bind(since)
        .fetch_one(pool)
        .await
        .context("Failed to count recent posts")?;

    Ok(count)
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        content: row.get("content"),
        image: row.get("image"),
        category: row.get("category"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (slug, title, content, image, category, author_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.category)
    .bind(post.author_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_id() as i64;

    Ok(Post {
        id,
        created_at: now,
        updated_at: now,
        ..post.clone()
    })
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_post_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn update_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE posts
        SET slug = ?, title = ?, content = ?, image = ?, category = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.category)
    .bind(now)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_mysql(pool, post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

async fn list_posts_mysql(
    pool: &MySqlPool,
    filter: &PostFilter,
    query: &ListQuery,
) -> Result<(Vec<Post>, i64)> {
    let where_clause = filter_where_clause(filter);

    let list_sql = format!(
        "SELECT {} FROM posts {} ORDER BY updated_at {} LIMIT ? OFFSET ?",
        POST_COLUMNS,
        where_clause,
        query.order.as_sql()
    );

    let mut list_query = sqlx::query(&list_sql);
    if let Some(author_id) = filter.author_id {
        list_query = list_query.bind(author_id);
    }
    if let Some(ref category) = filter.category {
        list_query = list_query.bind(category);
    }
    if let Some(ref slug) = filter.slug {
        list_query = list_query.bind(slug);
    }
    if let Some(post_id) = filter.post_id {
        list_query = list_query.bind(post_id);
    }
    if let Some(ref term) = filter.search_term {
        let pattern = search_pattern(term);
        list_query = list_query.bind(pattern.clone()).bind(pattern);
    }
    let rows = list_query
        .bind(query.limit)
        .bind(query.start_index)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row_to_post_mysql(&row)?);
    }

    let count_sql = format!("SELECT COUNT(*) FROM posts {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(author_id) = filter.author_id {
        count_query = count_query.bind(author_id);
    }
    if let Some(ref category) = filter.category {
        count_query = count_query.bind(category);
    }
    if let Some(ref slug) = filter.slug {
        count_query = count_query.bind(slug);
    }
    if let Some(post_id) = filter.post_id {
        count_query = count_query.bind(post_id);
    }
    if let Some(ref term) = filter.search_term {
        let pattern = search_pattern(term);
        count_query = count_query.bind(pattern.clone()).bind(pattern);
    }
    let total = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok((posts, total))
}

async fn count_posts_since_mysql(pool: &MySqlPool, since: DateTime<Utc>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE created_at > ?")
        .bind(since)
        .fetch_one(pool)
        .await
        .context("Failed to count recent posts")?;

    Ok(count)
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        content: row.get("content"),
        image: row.get("image"),
        category: row.get("category"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
