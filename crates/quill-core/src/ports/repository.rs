use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentWithAuthor, Post, PostDetail, PostWithAuthor, User};
use crate::error::RepoError;
use crate::filter::ListFilter;
use crate::pagination::PageWindow;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// A repository that can serve filtered, ordered pages of `T`.
///
/// `count` and `fetch_page` are independent queries; a write landing
/// between them may make the count stale by that one write, which the
/// listing design accepts.
#[async_trait]
pub trait PagedRepository<T>: Send + Sync {
    /// Number of records matching the filter.
    async fn count(&self, filter: &ListFilter) -> Result<u64, RepoError>;

    /// Fetch one window of matching records, newest-updated-first.
    async fn fetch_page(
        &self,
        filter: &ListFilter,
        window: PageWindow,
    ) -> Result<Vec<T>, RepoError>;
}

/// User repository. Keyword listings match against the email field.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> + PagedRepository<User> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Keyword listings match against the title field and
/// expand the owning author.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> + PagedRepository<PostWithAuthor> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// The single-post read path: post plus author and categories.
    async fn find_detail_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, RepoError>;

    /// All posts owned by a user, for cascade planning.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Bulk-delete posts by id. Returns the number of rows removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, RepoError>;

    /// Replace the category associations of a post.
    async fn set_categories(&self, post_id: Uuid, category_ids: &[Uuid]) -> Result<(), RepoError>;

    /// Remove a category from every post referencing it. Returns the
    /// number of associations removed.
    async fn detach_category(&self, category_id: Uuid) -> Result<u64, RepoError>;

    /// Drop all category associations of the given posts.
    async fn detach_categories_of(&self, post_ids: &[Uuid]) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Approved comments of a post with their authors, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError>;

    /// Bulk-delete every comment referencing any of the given posts.
    /// Returns the number of rows removed.
    async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError>;

    /// Delete the replies of a comment. Returns the number of rows removed.
    async fn delete_replies(&self, parent_id: Uuid) -> Result<u64, RepoError>;
}

/// Category repository. Keyword listings match against the title field.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> + PagedRepository<Category> {
    async fn find_by_title(&self, title: &str) -> Result<Option<Category>, RepoError>;
}
