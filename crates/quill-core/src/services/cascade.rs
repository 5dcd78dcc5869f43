//! The cascade delete coordinator.
//!
//! Deleting a parent record removes everything reachable through its
//! dependency edges before the parent itself disappears:
//! comments depend on posts, posts depend on users, replies depend on
//! comments, and category associations are detached rather than deleted.
//! Binary assets are cleaned up last, best-effort.
//!
//! The steps of one cascade run sequentially within a request but are
//! not wrapped in a transaction; a crash between steps leaves at worst a
//! parent without dependents, never dangling children.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Actor;
use crate::error::DomainError;
use crate::ports::{
    AssetStore, BaseRepository, CategoryRepository, CommentRepository, PostRepository,
    UserRepository,
};

/// What a completed cascade removed, reported back to the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeReport {
    /// The parent record's id.
    pub id: Uuid,
    pub posts_deleted: u64,
    pub comments_deleted: u64,
    pub categories_detached: u64,
}

/// Coordinates multi-collection deletes over the repository ports.
pub struct CascadeDelete {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    categories: Arc<dyn CategoryRepository>,
    assets: Arc<dyn AssetStore>,
}

impl CascadeDelete {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        categories: Arc<dyn CategoryRepository>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
            categories,
            assets,
        }
    }

    /// Delete a post by slug: its comments and category associations go
    /// first, the post itself second, its photo last (best-effort).
    /// Allowed for the post's owner and for admins.
    pub async fn delete_post(&self, actor: Actor, slug: &str) -> Result<CascadeReport, DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))?;

        if !actor.may_touch(post.user_id) {
            return Err(DomainError::Forbidden);
        }

        let comments_deleted = self.comments.delete_by_posts(&[post.id]).await?;
        self.posts.detach_categories_of(&[post.id]).await?;
        self.posts.delete(post.id).await?;

        discard_asset(self.assets.as_ref(), post.photo.as_deref()).await;

        tracing::info!(post_id = %post.id, comments_deleted, "post deleted");
        Ok(CascadeReport {
            id: post.id,
            posts_deleted: 1,
            comments_deleted,
            ..CascadeReport::default()
        })
    }

    /// Delete a user and everything they own: comments on their posts,
    /// the posts, then the user, then every associated asset. Admin only.
    pub async fn delete_user(&self, actor: Actor, id: Uuid) -> Result<CascadeReport, DomainError> {
        if !actor.admin {
            return Err(DomainError::Forbidden);
        }

        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id.to_string()))?;

        let owned = self.posts.find_by_user_id(user.id).await?;
        let post_ids: Vec<Uuid> = owned.iter().map(|p| p.id).collect();

        let comments_deleted = self.comments.delete_by_posts(&post_ids).await?;
        self.posts.detach_categories_of(&post_ids).await?;
        let posts_deleted = self.posts.delete_many(&post_ids).await?;
        self.users.delete(user.id).await?;

        for post in &owned {
            discard_asset(self.assets.as_ref(), post.photo.as_deref()).await;
        }
        discard_asset(self.assets.as_ref(), user.avatar.as_deref()).await;

        tracing::info!(user_id = %user.id, posts_deleted, comments_deleted, "user deleted");
        Ok(CascadeReport {
            id: user.id,
            posts_deleted,
            comments_deleted,
            ..CascadeReport::default()
        })
    }

    /// Delete a comment and its replies. Allowed for the comment's
    /// author and for admins.
    pub async fn delete_comment(
        &self,
        actor: Actor,
        id: Uuid,
    ) -> Result<CascadeReport, DomainError> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id.to_string()))?;

        if !actor.may_touch(comment.user_id) {
            return Err(DomainError::Forbidden);
        }

        let replies_deleted = self.comments.delete_replies(comment.id).await?;
        self.comments.delete(comment.id).await?;

        tracing::info!(comment_id = %comment.id, replies_deleted, "comment deleted");
        Ok(CascadeReport {
            id: comment.id,
            comments_deleted: replies_deleted + 1,
            ..CascadeReport::default()
        })
    }

    /// Delete a category after detaching it from every post. Admin only.
    pub async fn delete_category(
        &self,
        actor: Actor,
        id: Uuid,
    ) -> Result<CascadeReport, DomainError> {
        if !actor.admin {
            return Err(DomainError::Forbidden);
        }

        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id.to_string()))?;

        let categories_detached = self.posts.detach_category(category.id).await?;
        self.categories.delete(category.id).await?;

        tracing::info!(category_id = %category.id, categories_detached, "category deleted");
        Ok(CascadeReport {
            id: category.id,
            categories_detached,
            ..CascadeReport::default()
        })
    }
}

/// Ask the asset store to drop a reference, swallowing failures.
///
/// Asset cleanup is explicitly not part of any operation's success
/// criterion; a failed removal is logged and forgotten.
pub async fn discard_asset(assets: &dyn AssetStore, reference: Option<&str>) {
    let Some(reference) = reference.filter(|r| !r.is_empty()) else {
        return;
    };
    if let Err(err) = assets.remove(reference).await {
        tracing::warn!(%reference, error = %err, "asset removal failed, continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Comment, CommentWithAuthor, Post, PostDetail, PostWithAuthor, User};
    use crate::error::RepoError;
    use crate::filter::ListFilter;
    use crate::pagination::PageWindow;
    use crate::ports::{AssetError, PagedRepository};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Shared in-memory tables behind the repository fakes.
    #[derive(Default)]
    struct FakeDb {
        users: Mutex<Vec<User>>,
        posts: Mutex<Vec<Post>>,
        comments: Mutex<Vec<Comment>>,
        categories: Mutex<Vec<Category>>,
        links: Mutex<Vec<(Uuid, Uuid)>>, // (post_id, category_id)
    }

    struct FakeUsers(Arc<FakeDb>);
    struct FakePosts(Arc<FakeDb>);
    struct FakeComments(Arc<FakeDb>);
    struct FakeCategories(Arc<FakeDb>);

    /// Asset store that records removals and can be told to fail.
    struct RecordingAssets {
        fail: bool,
        removed: Mutex<Vec<String>>,
    }

    impl RecordingAssets {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                removed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AssetStore for RecordingAssets {
        async fn store(&self, _bytes: &[u8], _mime: &str) -> Result<String, AssetError> {
            Ok("/uploads/fake".to_string())
        }

        async fn remove(&self, reference: &str) -> Result<(), AssetError> {
            if self.fail {
                return Err(AssetError::Io("disk on fire".to_string()));
            }
            self.removed.lock().unwrap().push(reference.to_string());
            Ok(())
        }
    }

    #[async_trait]
    impl BaseRepository<User, Uuid> for FakeUsers {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.0.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }
        async fn insert(&self, user: User) -> Result<User, RepoError> {
            self.0.users.lock().unwrap().push(user.clone());
            Ok(user)
        }
        async fn update(&self, user: User) -> Result<User, RepoError> {
            let mut users = self.0.users.lock().unwrap();
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(slot) => {
                    *slot = user.clone();
                    Ok(user)
                }
                None => Err(RepoError::NotFound),
            }
        }
        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            let mut users = self.0.users.lock().unwrap();
            let before = users.len();
            users.retain(|u| u.id != id);
            if users.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PagedRepository<User> for FakeUsers {
        async fn count(&self, _filter: &ListFilter) -> Result<u64, RepoError> {
            Ok(self.0.users.lock().unwrap().len() as u64)
        }
        async fn fetch_page(
            &self,
            _filter: &ListFilter,
            window: PageWindow,
        ) -> Result<Vec<User>, RepoError> {
            Ok(self
                .0
                .users
                .lock()
                .unwrap()
                .iter()
                .skip(window.skip as usize)
                .take(window.limit as usize)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self
                .0
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for FakePosts {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.0.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }
        async fn insert(&self, post: Post) -> Result<Post, RepoError> {
            self.0.posts.lock().unwrap().push(post.clone());
            Ok(post)
        }
        async fn update(&self, post: Post) -> Result<Post, RepoError> {
            let mut posts = self.0.posts.lock().unwrap();
            match posts.iter_mut().find(|p| p.id == post.id) {
                Some(slot) => {
                    *slot = post.clone();
                    Ok(post)
                }
                None => Err(RepoError::NotFound),
            }
        }
        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            let mut posts = self.0.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| p.id != id);
            if posts.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PagedRepository<PostWithAuthor> for FakePosts {
        async fn count(&self, _filter: &ListFilter) -> Result<u64, RepoError> {
            Ok(self.0.posts.lock().unwrap().len() as u64)
        }
        async fn fetch_page(
            &self,
            _filter: &ListFilter,
            window: PageWindow,
        ) -> Result<Vec<PostWithAuthor>, RepoError> {
            Ok(self
                .0
                .posts
                .lock()
                .unwrap()
                .iter()
                .skip(window.skip as usize)
                .take(window.limit as usize)
                .map(|post| PostWithAuthor {
                    post: post.clone(),
                    author: Default::default(),
                })
                .collect())
        }
    }

    #[async_trait]
    impl PostRepository for FakePosts {
        async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
            Ok(self
                .0
                .posts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.slug == slug)
                .cloned())
        }
        async fn find_detail_by_slug(&self, _slug: &str) -> Result<Option<PostDetail>, RepoError> {
            Ok(None)
        }
        async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
            Ok(self
                .0
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }
        async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, RepoError> {
            let mut posts = self.0.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| !ids.contains(&p.id));
            Ok((before - posts.len()) as u64)
        }
        async fn set_categories(
            &self,
            post_id: Uuid,
            category_ids: &[Uuid],
        ) -> Result<(), RepoError> {
            let mut links = self.0.links.lock().unwrap();
            links.retain(|(p, _)| *p != post_id);
            links.extend(category_ids.iter().map(|c| (post_id, *c)));
            Ok(())
        }
        async fn detach_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
            let mut links = self.0.links.lock().unwrap();
            let before = links.len();
            links.retain(|(_, c)| *c != category_id);
            Ok((before - links.len()) as u64)
        }
        async fn detach_categories_of(&self, post_ids: &[Uuid]) -> Result<(), RepoError> {
            self.0
                .links
                .lock()
                .unwrap()
                .retain(|(p, _)| !post_ids.contains(p));
            Ok(())
        }
    }

    #[async_trait]
    impl BaseRepository<Comment, Uuid> for FakeComments {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
            Ok(self
                .0
                .comments
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }
        async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
            self.0.comments.lock().unwrap().push(comment.clone());
            Ok(comment)
        }
        async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
            let mut comments = self.0.comments.lock().unwrap();
            match comments.iter_mut().find(|c| c.id == comment.id) {
                Some(slot) => {
                    *slot = comment.clone();
                    Ok(comment)
                }
                None => Err(RepoError::NotFound),
            }
        }
        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            let mut comments = self.0.comments.lock().unwrap();
            let before = comments.len();
            comments.retain(|c| c.id != id);
            if comments.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CommentRepository for FakeComments {
        async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
            Ok(self
                .0
                .comments
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.post_id == post_id && c.approved)
                .map(|c| CommentWithAuthor {
                    comment: c.clone(),
                    author: Default::default(),
                })
                .collect())
        }
        async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError> {
            let mut comments = self.0.comments.lock().unwrap();
            let before = comments.len();
            comments.retain(|c| !post_ids.contains(&c.post_id));
            Ok((before - comments.len()) as u64)
        }
        async fn delete_replies(&self, parent_id: Uuid) -> Result<u64, RepoError> {
            let mut comments = self.0.comments.lock().unwrap();
            let before = comments.len();
            comments.retain(|c| c.parent_id != Some(parent_id));
            Ok((before - comments.len()) as u64)
        }
    }

    #[async_trait]
    impl BaseRepository<Category, Uuid> for FakeCategories {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
            Ok(self
                .0
                .categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }
        async fn insert(&self, category: Category) -> Result<Category, RepoError> {
            self.0.categories.lock().unwrap().push(category.clone());
            Ok(category)
        }
        async fn update(&self, category: Category) -> Result<Category, RepoError> {
            let mut categories = self.0.categories.lock().unwrap();
            match categories.iter_mut().find(|c| c.id == category.id) {
                Some(slot) => {
                    *slot = category.clone();
                    Ok(category)
                }
                None => Err(RepoError::NotFound),
            }
        }
        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            let mut categories = self.0.categories.lock().unwrap();
            let before = categories.len();
            categories.retain(|c| c.id != id);
            if categories.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PagedRepository<Category> for FakeCategories {
        async fn count(&self, _filter: &ListFilter) -> Result<u64, RepoError> {
            Ok(self.0.categories.lock().unwrap().len() as u64)
        }
        async fn fetch_page(
            &self,
            _filter: &ListFilter,
            window: PageWindow,
        ) -> Result<Vec<Category>, RepoError> {
            Ok(self
                .0
                .categories
                .lock()
                .unwrap()
                .iter()
                .skip(window.skip as usize)
                .take(window.limit as usize)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl CategoryRepository for FakeCategories {
        async fn find_by_title(&self, title: &str) -> Result<Option<Category>, RepoError> {
            Ok(self
                .0
                .categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.title == title)
                .cloned())
        }
    }

    struct Harness {
        db: Arc<FakeDb>,
        assets: Arc<RecordingAssets>,
        cascade: CascadeDelete,
    }

    fn harness(failing_assets: bool) -> Harness {
        let db = Arc::new(FakeDb::default());
        let assets = Arc::new(RecordingAssets::new(failing_assets));
        let cascade = CascadeDelete::new(
            Arc::new(FakeUsers(db.clone())),
            Arc::new(FakePosts(db.clone())),
            Arc::new(FakeComments(db.clone())),
            Arc::new(FakeCategories(db.clone())),
            assets.clone(),
        );
        Harness {
            db,
            assets,
            cascade,
        }
    }

    fn seed_user(h: &Harness, admin: bool) -> User {
        let mut user = User::new(
            "Ada".to_string(),
            format!("{}@example.com", Uuid::new_v4()),
            "hash".to_string(),
        );
        user.admin = admin;
        h.db.users.lock().unwrap().push(user.clone());
        user
    }

    fn seed_post(h: &Harness, owner: &User, photo: Option<&str>) -> Post {
        let mut post = Post::new(
            owner.id,
            "A title".to_string(),
            None,
            serde_json::json!({"type": "doc"}),
        );
        post.photo = photo.map(String::from);
        h.db.posts.lock().unwrap().push(post.clone());
        post
    }

    fn seed_comment(h: &Harness, author: &User, post: &Post, parent: Option<Uuid>) -> Comment {
        let comment = Comment::new(author.id, post.id, "nice".to_string(), parent, None);
        h.db.comments.lock().unwrap().push(comment.clone());
        comment
    }

    fn admin_actor() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            admin: true,
        }
    }

    #[tokio::test]
    async fn deleting_a_user_removes_their_posts_and_all_comments_on_them() {
        let h = harness(false);
        let victim = seed_user(&h, false);
        let commenter = seed_user(&h, false);

        let first = seed_post(&h, &victim, Some("/uploads/a.png"));
        let second = seed_post(&h, &victim, Some("/uploads/b.png"));
        for post in [&first, &second] {
            for _ in 0..3 {
                seed_comment(&h, &commenter, post, None);
            }
        }
        // An unrelated post keeps its comment.
        let bystander = seed_post(&h, &commenter, None);
        seed_comment(&h, &victim, &bystander, None);

        let report = h.cascade.delete_user(admin_actor(), victim.id).await.unwrap();

        assert_eq!(report.posts_deleted, 2);
        assert_eq!(report.comments_deleted, 6);
        assert!(h.db.users.lock().unwrap().iter().all(|u| u.id != victim.id));
        assert_eq!(h.db.posts.lock().unwrap().len(), 1);
        assert_eq!(h.db.comments.lock().unwrap().len(), 1);

        // Subsequent lookups report the records gone.
        let gone = h.cascade.delete_user(admin_actor(), victim.id).await;
        assert!(matches!(gone, Err(DomainError::NotFound { .. })));

        let removed = h.assets.removed.lock().unwrap();
        assert!(removed.contains(&"/uploads/a.png".to_string()));
        assert!(removed.contains(&"/uploads/b.png".to_string()));
    }

    #[tokio::test]
    async fn deleting_a_post_with_no_comments_leaves_other_posts_untouched() {
        let h = harness(false);
        let owner = seed_user(&h, false);
        let bare = seed_post(&h, &owner, None);
        let other = seed_post(&h, &owner, None);
        seed_comment(&h, &owner, &other, None);

        let actor = Actor {
            id: owner.id,
            admin: false,
        };
        let report = h.cascade.delete_post(actor, &bare.slug).await.unwrap();

        assert_eq!(report.comments_deleted, 0);
        assert_eq!(h.db.posts.lock().unwrap().len(), 1);
        assert_eq!(h.db.comments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn asset_store_failure_does_not_fail_the_cascade() {
        let h = harness(true);
        let owner = seed_user(&h, false);
        let post = seed_post(&h, &owner, Some("/uploads/gone.png"));

        let actor = Actor {
            id: owner.id,
            admin: false,
        };
        let report = h.cascade.delete_post(actor, &post.slug).await.unwrap();

        assert_eq!(report.posts_deleted, 1);
        assert!(h.db.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_a_post() {
        let h = harness(false);
        let owner = seed_user(&h, false);
        let stranger = seed_user(&h, false);
        let post = seed_post(&h, &owner, None);

        let actor = Actor {
            id: stranger.id,
            admin: false,
        };
        let denied = h.cascade.delete_post(actor, &post.slug).await;
        assert!(matches!(denied, Err(DomainError::Forbidden)));
        assert_eq!(h.db.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_comment_takes_its_replies_along() {
        let h = harness(false);
        let owner = seed_user(&h, false);
        let post = seed_post(&h, &owner, None);
        let parent = seed_comment(&h, &owner, &post, None);
        seed_comment(&h, &owner, &post, Some(parent.id));
        seed_comment(&h, &owner, &post, Some(parent.id));
        let unrelated = seed_comment(&h, &owner, &post, None);

        let actor = Actor {
            id: owner.id,
            admin: false,
        };
        let report = h.cascade.delete_comment(actor, parent.id).await.unwrap();

        assert_eq!(report.comments_deleted, 3);
        let left = h.db.comments.lock().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, unrelated.id);
    }

    #[tokio::test]
    async fn deleting_a_category_detaches_it_from_posts() {
        let h = harness(false);
        let owner = seed_user(&h, false);
        let post = seed_post(&h, &owner, None);
        let category = Category::new("rustlang".to_string());
        h.db.categories.lock().unwrap().push(category.clone());
        h.db.links.lock().unwrap().push((post.id, category.id));

        let report = h
            .cascade
            .delete_category(admin_actor(), category.id)
            .await
            .unwrap();

        assert_eq!(report.categories_detached, 1);
        assert!(h.db.links.lock().unwrap().is_empty());
        assert!(h.db.categories.lock().unwrap().is_empty());
        assert_eq!(h.db.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn user_deletion_requires_admin() {
        let h = harness(false);
        let victim = seed_user(&h, false);
        let peasant = Actor {
            id: Uuid::new_v4(),
            admin: false,
        };
        let denied = h.cascade.delete_user(peasant, victim.id).await;
        assert!(matches!(denied, Err(DomainError::Forbidden)));
    }
}
