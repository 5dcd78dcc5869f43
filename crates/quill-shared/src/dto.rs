//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{Author, Category, Comment, CommentWithAuthor, Post, PostWithAuthor, User};
use quill_core::pagination::{Page, PageMeta};
use quill_core::services::CommentThread;

/// Query parameters accepted by every listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search_keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One page of items plus its pagination metadata, returned as a single
/// structured value instead of out-of-band headers.
#[derive(Debug, Clone, Serialize)]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PageEnvelope<T> {
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        Self {
            items: page.items.into_iter().map(f).collect(),
            meta: page.meta,
        }
    }
}

/// Request to register a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile update. Absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub admin: Option<bool>,
}

/// Avatar upload: a `data:` URI, or `null` to clear the current avatar.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAvatarRequest {
    pub avatar: Option<String>,
}

/// A user's own profile plus a fresh access token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub admin: bool,
    pub verified: bool,
    pub token: String,
}

impl AuthUserResponse {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            admin: user.admin,
            verified: user.verified,
            token,
        }
    }
}

/// A user as seen in the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub admin: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            admin: user.admin,
            verified: user.verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The public author block attached to posts and comments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub verified: bool,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            avatar: author.avatar,
            verified: author.verified,
        }
    }
}

/// Request to create a post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub caption: Option<String>,
    pub body: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    /// Optional `data:` URI.
    pub photo: Option<String>,
}

/// Partial post update. Absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub slug: Option<String>,
    pub body: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<Uuid>>,
    /// Replacement image as a `data:` URI.
    pub photo: Option<String>,
    /// Explicit request to drop the current image.
    #[serde(default)]
    pub remove_photo: bool,
}

/// A post as returned by the write paths.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub caption: Option<String>,
    pub slug: String,
    pub body: serde_json::Value,
    pub photo: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            caption: post.caption,
            slug: post.slug,
            body: post.body,
            photo: post.photo,
            tags: post.tags,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// A post in a listing, expanded with its author.
#[derive(Debug, Clone, Serialize)]
pub struct PostListItem {
    #[serde(flatten)]
    pub post: PostResponse,
    pub author: AuthorResponse,
}

impl From<PostWithAuthor> for PostListItem {
    fn from(entry: PostWithAuthor) -> Self {
        Self {
            post: entry.post.into(),
            author: entry.author.into(),
        }
    }
}

/// The single-post read path: post, author, categories, comment tree.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub author: AuthorResponse,
    pub categories: Vec<CategoryResponse>,
    pub comments: Vec<CommentResponse>,
}

/// Request to create a comment on a post (by slug).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub body: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub reply_to_user_id: Option<Uuid>,
}

/// Partial comment update; `approved` is honored for admins only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCommentRequest {
    pub body: Option<String>,
    pub approved: Option<bool>,
}

/// A comment, optionally carrying its replies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub body: String,
    pub approved: bool,
    pub parent_id: Option<Uuid>,
    pub reply_to_user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorResponse>,
    pub replies: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn bare(comment: Comment) -> Self {
        Self {
            id: comment.id,
            user_id: comment.user_id,
            post_id: comment.post_id,
            body: comment.body,
            approved: comment.approved,
            parent_id: comment.parent_id,
            reply_to_user_id: comment.reply_to_user_id,
            author: None,
            replies: Vec::new(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }

    pub fn with_author(entry: CommentWithAuthor) -> Self {
        let mut response = Self::bare(entry.comment);
        response.author = Some(entry.author.into());
        response
    }

    pub fn from_thread(thread: CommentThread) -> Self {
        let mut response = Self::with_author(thread.comment);
        response.replies = thread
            .replies
            .into_iter()
            .map(Self::with_author)
            .collect();
        response
    }
}

/// Request to create or rename a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Acknowledgement of a (cascade) delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub message: String,
}
