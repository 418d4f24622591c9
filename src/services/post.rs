//! Post service
//!
//! Business logic for posts: creation with slug derivation, the filtered
//! public listing, and ownership-checked updates and deletes.

use crate::db::repositories::PostRepository;
use crate::models::{
    post::{slugify, DEFAULT_CATEGORY},
    CreatePostInput, ListQuery, Page, Post, PostFilter, UpdatePostInput, User,
};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Slug already in use
    #[error("A post with this title already exists")]
    SlugTaken,

    /// Post not found
    #[error("Post not found")]
    NotFound,

    /// Caller may not modify this post
    #[error("You can only modify your own posts")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service with the given repository
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a post authored by `author`.
    ///
    /// The slug is derived from the title; a duplicate title surfaces as
    /// `SlugTaken`.
    pub async fn create(
        &self,
        author: &User,
        input: CreatePostInput,
    ) -> Result<Post, PostServiceError> {
        if input.title.trim().is_empty() || input.content.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title and content are required".to_string(),
            ));
        }

        let slug = slugify(&input.title);
        if slug.is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title must contain at least one letter or number".to_string(),
            ));
        }

        if self
            .repo
            .get_by_slug(&slug)
            .await
            .context("Failed to check slug")?
            .is_some()
        {
            return Err(PostServiceError::SlugTaken);
        }

        let mut post = Post::new(input.title, input.content, author.id);
        if let Some(image) = input.image.filter(|s| !s.trim().is_empty()) {
            post.image = image;
        }
        if let Some(category) = input.category.filter(|s| !s.trim().is_empty()) {
            post.category = category;
        }

        let created = self
            .repo
            .create(&post)
            .await
            .context("Failed to create post")?;

        Ok(created)
    }

    /// Get a post by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, PostServiceError> {
        let post = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?;
        Ok(post)
    }

    /// List posts matching the filter
    pub async fn list(
        &self,
        filter: &PostFilter,
        query: &ListQuery,
    ) -> Result<Page<Post>, PostServiceError> {
        let query = query.clamped();

        let (items, total) = self
            .repo
            .list(filter, &query)
            .await
            .context("Failed to list posts")?;

        let month_ago = Utc::now() - Duration::days(30);
        let last_month = self
            .repo
            .count_since(month_ago)
            .await
            .context("Failed to count recent posts")?;

        Ok(Page {
            items,
            total,
            last_month,
        })
    }

    /// Update a post. The caller must own the post or be an admin.
    ///
    /// Changing the title re-derives the slug.
    pub async fn update(
        &self,
        actor: &User,
        id: i64,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let mut post = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to load post")?
            .ok_or(PostServiceError::NotFound)?;

        if !actor.can_modify(post.author_id) {
            return Err(PostServiceError::Forbidden);
        }

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
            let slug = slugify(&title);
            if slug.is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Title must contain at least one letter or number".to_string(),
                ));
            }
            if slug != post.slug {
                if self
                    .repo
                    .get_by_slug(&slug)
                    .await
                    .context("Failed to check slug")?
                    .is_some()
                {
                    return Err(PostServiceError::SlugTaken);
                }
                post.slug = slug;
            }
            post.title = title;
        }

        if let Some(content) = input.content {
            if content.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Content cannot be empty".to_string(),
                ));
            }
            post.content = content;
        }

        if let Some(image) = input.image.filter(|s| !s.trim().is_empty()) {
            post.image = image;
        }

        if let Some(category) = input.category {
            post.category = if category.trim().is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category
            };
        }

        let updated = self
            .repo
            .update(&post)
            .await
            .context("Failed to update post")?;

        Ok(updated)
    }

    /// Delete a post. The caller must own the post or be an admin.
    pub async fn delete(&self, actor: &User, id: i64) -> Result<(), PostServiceError> {
        let post = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to load post")?
            .ok_or(PostServiceError::NotFound)?;

        if !actor.can_modify(post.author_id) {
            return Err(PostServiceError::Forbidden);
        }

        self.repo.delete(id).await.context("Failed to delete post")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxPostRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (PostService, User, User) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let admin = users
            .create(&User::new(
                "admin".to_string(),
                "admin@example.com".to_string(),
                "hash".to_string(),
                true,
            ))
            .await
            .unwrap();
        let regular = users
            .create(&User::new(
                "writer".to_string(),
                "writer@example.com".to_string(),
                "hash".to_string(),
                false,
            ))
            .await
            .unwrap();

        (
            PostService::new(SqlxPostRepository::boxed(pool)),
            admin,
            regular,
        )
    }

    fn create_input(title: &str) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: format!("{} content", title),
            image: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let (service, admin, _) = setup().await;

        let post = service
            .create(&admin, create_input("My First Post"))
            .await
            .unwrap();

        assert_eq!(post.slug, "my-first-post");
        assert_eq!(post.author_id, admin.id);
        assert_eq!(post.category, DEFAULT_CATEGORY);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let (service, admin, _) = setup().await;

        let mut input = create_input("ok");
        input.title = "  ".to_string();
        assert!(matches!(
            service.create(&admin, input).await.unwrap_err(),
            PostServiceError::ValidationError(_)
        ));

        let mut input = create_input("ok");
        input.content = String::new();
        assert!(matches!(
            service.create(&admin, input).await.unwrap_err(),
            PostServiceError::ValidationError(_)
        ));

        // Title that slugifies to nothing
        let input = create_input("???");
        assert!(matches!(
            service.create(&admin, input).await.unwrap_err(),
            PostServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_title() {
        let (service, admin, _) = setup().await;
        service
            .create(&admin, create_input("Unique Title"))
            .await
            .unwrap();

        let err = service
            .create(&admin, create_input("Unique Title"))
            .await
            .unwrap_err();
        assert!(matches!(err, PostServiceError::SlugTaken));
    }

    #[tokio::test]
    async fn test_update_rederives_slug() {
        let (service, admin, _) = setup().await;
        let post = service
            .create(&admin, create_input("Old Title"))
            .await
            .unwrap();

        let updated = service
            .update(
                &admin,
                post.id,
                UpdatePostInput {
                    title: Some("New Title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.slug, "new-title");
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let (service, admin, regular) = setup().await;
        let post = service
            .create(&admin, create_input("Admin Post"))
            .await
            .unwrap();

        let err = service
            .update(
                &regular,
                post.id,
                UpdatePostInput {
                    content: Some("hijacked".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PostServiceError::Forbidden));

        // Admin can edit another author's post
        let own = service
            .create(&regular, create_input("Writer Post"))
            .await
            .unwrap();
        let edited = service
            .update(
                &admin,
                own.id,
                UpdatePostInput {
                    content: Some("moderated".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.content, "moderated");
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let (service, admin, regular) = setup().await;
        let post = service
            .create(&admin, create_input("Keep Out"))
            .await
            .unwrap();

        assert!(matches!(
            service.delete(&regular, post.id).await.unwrap_err(),
            PostServiceError::Forbidden
        ));

        service.delete(&admin, post.id).await.unwrap();
        assert!(service.get_by_id(post.id).await.unwrap().is_none());

        assert!(matches!(
            service.delete(&admin, post.id).await.unwrap_err(),
            PostServiceError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_list_with_counters() {
        let (service, admin, _) = setup().await;
        for i in 0..3 {
            service
                .create(&admin, create_input(&format!("Post {}", i)))
                .await
                .unwrap();
        }

        let page = service
            .list(&PostFilter::default(), &ListQuery::default())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 3);
        assert_eq!(page.last_month, 3);
    }
}
