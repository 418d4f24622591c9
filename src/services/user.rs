//! User service
//!
//! Business logic for account management:
//! - Registration (the first user becomes admin)
//! - Credential checks for sign-in
//! - Profile updates with re-validation
//! - Admin listing with the dashboard counters

use crate::db::repositories::UserRepository;
use crate::models::{ListQuery, Page, UpdateUserInput, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Minimum password length
const MIN_PASSWORD_LENGTH: usize = 6;

/// Username length bounds
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// User service for managing accounts
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service with the given repository
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Register a new user.
    ///
    /// The first user in the system automatically becomes an administrator.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        // First user becomes admin
        let is_admin = self.is_first_user().await?;

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(input.username, input.email, password_hash, is_admin);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Check credentials for sign-in, returning the user on success.
    ///
    /// Unknown email and wrong password produce the same error so the
    /// endpoint cannot be used to enumerate accounts.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let user = self
            .user_repo
            .get_by_email(email)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid email or password".to_string())
            })?;

        let password_valid =
            verify_password(password, &user.password_hash).context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// Update a user's profile fields, re-validating and re-checking
    /// uniqueness where needed.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to load user")?
            .ok_or(UserServiceError::NotFound)?;

        if let Some(username) = input.username {
            validate_username(&username)?;
            if username != user.username {
                if self
                    .user_repo
                    .get_by_username(&username)
                    .await
                    .context("Failed to check username")?
                    .is_some()
                {
                    return Err(UserServiceError::UserExists(format!(
                        "Username '{}' is already taken",
                        username
                    )));
                }
                user.username = username;
            }
        }

        if let Some(email) = input.email {
            validate_email(&email)?;
            if email != user.email {
                if self
                    .user_repo
                    .get_by_email(&email)
                    .await
                    .context("Failed to check email")?
                    .is_some()
                {
                    return Err(UserServiceError::UserExists(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
                user.email = email;
            }
        }

        if let Some(password) = input.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password).context("Failed to hash password")?;
        }

        if let Some(profile_picture) = input.profile_picture {
            user.profile_picture = profile_picture;
        }

        let updated = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        Ok(updated)
    }

    /// Delete a user account
    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        let removed = self
            .user_repo
            .delete(id)
            .await
            .context("Failed to delete user")?;

        if !removed {
            return Err(UserServiceError::NotFound);
        }

        Ok(())
    }

    /// List users for the admin dashboard
    pub async fn list(&self, query: &ListQuery) -> Result<Page<User>, UserServiceError> {
        let query = query.clamped();

        let items = self
            .user_repo
            .list(query.start_index, query.limit, query.order)
            .await
            .context("Failed to list users")?;

        let total = self.user_repo.count().await.context("Failed to count users")?;

        let month_ago = Utc::now() - Duration::days(30);
        let last_month = self
            .user_repo
            .count_since(month_ago)
            .await
            .context("Failed to count recent users")?;

        Ok(Page {
            items,
            total,
            last_month,
        })
    }

    /// True when no users exist yet
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self.user_repo.count().await.context("Failed to count users")?;
        Ok(count == 0)
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if username.is_empty() {
        return Err(UserServiceError::ValidationError(
            "Username is required".to_string(),
        ));
    }
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        return Err(UserServiceError::ValidationError(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if username.contains(' ') {
        return Err(UserServiceError::ValidationError(
            "Username cannot contain spaces".to_string(),
        ));
    }
    if username != username.to_lowercase() {
        return Err(UserServiceError::ValidationError(
            "Username must be lowercase".to_string(),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(UserServiceError::ValidationError(
            "Username can only contain letters and numbers".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    if email.is_empty() {
        return Err(UserServiceError::ValidationError(
            "Email is required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(UserServiceError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.is_empty() {
        return Err(UserServiceError::ValidationError(
            "Password is required".to_string(),
        ));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::SortOrder;

    async fn setup() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        UserService::new(SqlxUserRepository::boxed(pool))
    }

    fn register_input(name: &str) -> RegisterInput {
        RegisterInput {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = setup().await;

        let first = service.register(register_input("first")).await.unwrap();
        assert!(first.is_admin);

        let second = service.register(register_input("second")).await.unwrap();
        assert!(!second.is_admin);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = setup().await;
        service.register(register_input("taken")).await.unwrap();

        let err = service.register(register_input("taken")).await.unwrap_err();
        assert!(matches!(err, UserServiceError::UserExists(_)));

        // Same email, different username
        let mut input = register_input("different");
        input.email = "taken@example.com".to_string();
        let err = service.register(input).await.unwrap_err();
        assert!(matches!(err, UserServiceError::UserExists(_)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup().await;

        let mut input = register_input("ok");
        input.password = "short".to_string();
        assert!(matches!(
            service.register(input).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));

        let mut input = register_input("ok");
        input.username = "Has Spaces".to_string();
        assert!(matches!(
            service.register(input).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));

        let mut input = register_input("ok");
        input.username = "UPPERCASE".to_string();
        assert!(matches!(
            service.register(input).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));

        let mut input = register_input("ok");
        input.email = "not-an-email".to_string();
        assert!(matches!(
            service.register(input).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));

        let mut input = register_input("ok");
        input.username = "ab".to_string();
        assert!(matches!(
            service.register(input).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let service = setup().await;
        service.register(register_input("alice")).await.unwrap();

        let user = service
            .authenticate("alice@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");

        let wrong_password = service
            .authenticate("alice@example.com", "wrong")
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate("ghost@example.com", "password123")
            .await
            .unwrap_err();

        // Same error either way
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = setup().await;
        let user = service.register(register_input("bob")).await.unwrap();

        let updated = service
            .update(
                user.id,
                UpdateUserInput {
                    username: Some("bobby".to_string()),
                    profile_picture: Some("https://example.com/pic.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "bobby");
        assert_eq!(updated.profile_picture, "https://example.com/pic.png");
    }

    #[tokio::test]
    async fn test_update_password_changes_hash() {
        let service = setup().await;
        let user = service.register(register_input("carol")).await.unwrap();

        service
            .update(
                user.id,
                UpdateUserInput {
                    password: Some("newpassword".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service
            .authenticate("carol@example.com", "newpassword")
            .await
            .is_ok());
        assert!(service
            .authenticate("carol@example.com", "password123")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_username() {
        let service = setup().await;
        service.register(register_input("first")).await.unwrap();
        let user = service.register(register_input("second")).await.unwrap();

        let err = service
            .update(
                user.id,
                UpdateUserInput {
                    username: Some("first".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::UserExists(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup().await;
        let user = service.register(register_input("dave")).await.unwrap();

        service.delete(user.id).await.unwrap();
        assert!(service.get_by_id(user.id).await.unwrap().is_none());

        assert!(matches!(
            service.delete(user.id).await.unwrap_err(),
            UserServiceError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_list_with_counters() {
        let service = setup().await;
        for name in ["u1", "u2", "u3"] {
            service.register(register_input(name)).await.unwrap();
        }

        let page = service
            .list(&ListQuery {
                start_index: 0,
                limit: 2,
                order: SortOrder::Desc,
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.last_month, 3);
    }
}
