//! Repository layer
//!
//! Data access traits and their SQLx implementations. Each repository
//! dispatches on the configured driver to SQLite or MySQL query functions.

pub mod comment;
pub mod post;
pub mod user;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use user::{SqlxUserRepository, UserRepository};
