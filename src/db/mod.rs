//! Database layer
//!
//! Provides the connection pool abstraction (SQLite for single-binary
//! deployment, MySQL for larger ones), embedded migrations, and the
//! repositories the services are built on.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
