//! User model
//!
//! This module defines the User entity and related input types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default avatar shown until a user sets a profile picture
pub const DEFAULT_PROFILE_PICTURE: &str =
    "https://cdn.pixabay.com/photo/2015/10/05/22/37/blank-profile-picture-973460_1280.png";

/// User entity representing a registered user.
///
/// Admins can manage all content; regular users can only manage their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Profile picture URL
    pub profile_picture: String,
    /// Administrator flag
    pub is_admin: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(username: String, email: String, password_hash: String, is_admin: bool) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user can modify content owned by `author_id`.
    ///
    /// Admins can modify anything; regular users only their own.
    pub fn can_modify(&self, author_id: i64) -> bool {
        self.is_admin || self.id == author_id
    }
}

/// Input for updating a user profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    /// New username (optional)
    pub username: Option<String>,
    /// New email (optional)
    pub email: Option<String>,
    /// New password (optional, will be hashed)
    pub password: Option<String>,
    /// New profile picture URL (optional)
    pub profile_picture: Option<String>,
}

impl UpdateUserInput {
    /// True if the input changes nothing
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.profile_picture.is_none()
    }
}
