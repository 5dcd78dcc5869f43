use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Author;

/// Comment entity - attached to a post, optionally replying to another
/// comment. Comments start unapproved and become visible once moderated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub body: String,
    pub approved: bool,
    /// Parent comment for replies. Only one level of nesting exists.
    pub parent_id: Option<Uuid>,
    /// The user the reply addresses, when different from the parent's author.
    pub reply_to_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        user_id: Uuid,
        post_id: Uuid,
        body: String,
        parent_id: Option<Uuid>,
        reply_to_user_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            body,
            approved: false,
            parent_id,
            reply_to_user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A comment expanded with its author, as fetched for the post read path.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: Author,
}
