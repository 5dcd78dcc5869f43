//! PostgreSQL repository implementations.
//!
//! Listing queries share one shape: a keyword condition comparing the
//! lowercased designated column against an escaped `LIKE` pattern,
//! newest-updated-first ordering, and an offset/limit window handed down
//! by the pager.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DbErr, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use quill_core::domain::{Category, CommentWithAuthor, Post, PostDetail, PostWithAuthor, User};
use quill_core::error::RepoError;
use quill_core::filter::ListFilter;
use quill_core::pagination::PageWindow;
use quill_core::ports::{
    CategoryRepository, CommentRepository, PagedRepository, PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category;
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

fn query_err(err: DbErr) -> RepoError {
    RepoError::Query(err.to_string())
}

/// `LOWER(col) LIKE <pattern> ESCAPE '\'` - the pattern arrives
/// lowercased and wildcard-escaped from the filter builder.
fn ci_like(col: impl IntoColumnRef, pattern: String) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

fn user_condition(filter: &ListFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(pattern) = filter.like_pattern() {
        cond = cond.add(ci_like((user::Entity, user::Column::Email), pattern));
    }
    cond
}

fn post_condition(filter: &ListFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(pattern) = filter.like_pattern() {
        cond = cond.add(ci_like((post::Entity, post::Column::Title), pattern));
    }
    if let Some(owner) = filter.owner {
        cond = cond.add(post::Column::UserId.eq(owner));
    }
    cond
}

fn category_condition(filter: &ListFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(pattern) = filter.like_pattern() {
        cond = cond.add(ci_like((category::Entity, category::Column::Title), pattern));
    }
    cond
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.find('@') {
            Some(at) => {
                let (local, domain) = email.split_at(at);
                if local.len() > 1 {
                    format!("{}***{}", &local[..1], domain)
                } else {
                    format!("***{domain}")
                }
            }
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PagedRepository<User> for PostgresUserRepository {
    async fn count(&self, filter: &ListFilter) -> Result<u64, RepoError> {
        UserEntity::find()
            .filter(user_condition(filter))
            .count(&self.db)
            .await
            .map_err(query_err)
    }

    async fn fetch_page(
        &self,
        filter: &ListFilter,
        window: PageWindow,
    ) -> Result<Vec<User>, RepoError> {
        let rows = UserEntity::find()
            .filter(user_condition(filter))
            .order_by_desc(user::Column::UpdatedAt)
            .offset(window.skip)
            .limit(window.limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PagedRepository<PostWithAuthor> for PostgresPostRepository {
    async fn count(&self, filter: &ListFilter) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post_condition(filter))
            .count(&self.db)
            .await
            .map_err(query_err)
    }

    async fn fetch_page(
        &self,
        filter: &ListFilter,
        window: PageWindow,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = PostEntity::find()
            .filter(post_condition(filter))
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::UpdatedAt)
            .offset(window.skip)
            .limit(window.limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|(model, author)| PostWithAuthor {
                post: model.into(),
                author: author.map(Into::into).unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_detail_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, RepoError> {
        let found = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        let Some((model, author)) = found else {
            return Ok(None);
        };

        let categories = model
            .find_related(CategoryEntity)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(Some(PostDetail {
            post: model.into(),
            author: author.map(Into::into).unwrap_or_default(),
            categories: categories.into_iter().map(Into::into).collect(),
        }))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = PostEntity::delete_many()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }

    async fn set_categories(&self, post_id: Uuid, category_ids: &[Uuid]) -> Result<(), RepoError> {
        post_category::Entity::delete_many()
            .filter(post_category::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if category_ids.is_empty() {
            return Ok(());
        }

        let rows = category_ids.iter().map(|id| post_category::ActiveModel {
            post_id: Set(post_id),
            category_id: Set(*id),
        });
        post_category::Entity::insert_many(rows)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(())
    }

    async fn detach_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        let result = post_category::Entity::delete_many()
            .filter(post_category::Column::CategoryId.eq(category_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }

    async fn detach_categories_of(&self, post_ids: &[Uuid]) -> Result<(), RepoError> {
        if post_ids.is_empty() {
            return Ok(());
        }

        post_category::Entity::delete_many()
            .filter(post_category::Column::PostId.is_in(post_ids.to_vec()))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Approved.eq(true))
            .find_also_related(UserEntity)
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|(model, author)| CommentWithAuthor {
                comment: model.into(),
                author: author.map(Into::into).unwrap_or_default(),
            })
            .collect())
    }

    async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError> {
        if post_ids.is_empty() {
            return Ok(0);
        }

        let result = CommentEntity::delete_many()
            .filter(comment::Column::PostId.is_in(post_ids.to_vec()))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }

    async fn delete_replies(&self, parent_id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::ParentId.eq(parent_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_title(&self, title: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Title.eq(title))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PagedRepository<Category> for PostgresCategoryRepository {
    async fn count(&self, filter: &ListFilter) -> Result<u64, RepoError> {
        CategoryEntity::find()
            .filter(category_condition(filter))
            .count(&self.db)
            .await
            .map_err(query_err)
    }

    async fn fetch_page(
        &self,
        filter: &ListFilter,
        window: PageWindow,
    ) -> Result<Vec<Category>, RepoError> {
        let rows = CategoryEntity::find()
            .filter(category_condition(filter))
            .order_by_desc(category::Column::UpdatedAt)
            .offset(window.skip)
            .limit(window.limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
