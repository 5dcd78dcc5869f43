//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    AssetStore, CategoryRepository, CommentRepository, PostRepository, UserRepository,
};
use quill_core::services::CascadeDelete;
use quill_infra::database::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};
use quill_infra::{DatabaseConfig, FsAssetStore, connect};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub assets: Arc<dyn AssetStore>,
    pub cascade: Arc<CascadeDelete>,
}

impl AppState {
    /// Build the application state. The database is required at startup.
    pub async fn new(config: &AppConfig) -> Result<Self, String> {
        let db_config: &DatabaseConfig = config
            .database
            .as_ref()
            .ok_or_else(|| "DATABASE_URL is not set".to_string())?;

        let db = connect(db_config)
            .await
            .map_err(|e| format!("failed to connect to database: {e}"))?;

        let users = Arc::new(PostgresUserRepository::new(db.clone()));
        let posts = Arc::new(PostgresPostRepository::new(db.clone()));
        let comments = Arc::new(PostgresCommentRepository::new(db.clone()));
        let categories = Arc::new(PostgresCategoryRepository::new(db));
        let assets = Arc::new(FsAssetStore::new(config.uploads_dir.clone()));

        let cascade = Arc::new(CascadeDelete::new(
            users.clone(),
            posts.clone(),
            comments.clone(),
            categories.clone(),
            assets.clone(),
        ));

        tracing::info!("Application state initialized");

        Ok(Self {
            users,
            posts,
            comments,
            categories,
            assets,
            cascade,
        })
    }
}
