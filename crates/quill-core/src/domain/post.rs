use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::user::Author;

/// Post entity - a blog article with a rich-text body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub caption: Option<String>,
    /// Unique, URL-safe key. Generated as a uuid at creation; may be
    /// changed later through an explicit update.
    pub slug: String,
    /// Rich-text editor document, stored verbatim.
    pub body: serde_json::Value,
    /// Reference into the asset store, e.g. `/uploads/<file>`.
    pub photo: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `user_id`, with a generated slug.
    pub fn new(
        user_id: Uuid,
        title: String,
        caption: Option<String>,
        body: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            caption,
            slug: Uuid::new_v4().to_string(),
            body,
            photo: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post expanded with its author, as returned by listings.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}

/// A post expanded with author and categories, as returned by the
/// single-post read path.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: Author,
    pub categories: Vec<Category>,
}
