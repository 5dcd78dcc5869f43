//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! PostgreSQL repositories via SeaORM, JWT + Argon2 authentication, and
//! the filesystem asset store.

pub mod assets;
pub mod auth;
pub mod database;

pub use assets::FsAssetStore;
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};
