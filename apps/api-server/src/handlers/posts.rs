//! Post handlers: CRUD, public/owner listings, the single-post read
//! path with its comment tree, and cascade delete.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Post, PostWithAuthor};
use quill_core::filter::ListFilter;
use quill_core::media::DataUri;
use quill_core::pagination::PageRequest;
use quill_core::ports::{BaseRepository, CommentRepository, PagedRepository, PostRepository};
use quill_core::services::{assemble_threads, discard_asset, list_page};
use quill_shared::dto::{
    CommentResponse, CreatePostRequest, DeleteResponse, ListQuery, PageEnvelope, PostDetailResponse,
    PostListItem, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 12;

async fn list_response(
    state: &AppState,
    filter: ListFilter,
    q: ListQuery,
) -> AppResult<HttpResponse> {
    let request = PageRequest::new(q.page.unwrap_or(1), q.limit.unwrap_or(DEFAULT_PAGE_SIZE));

    let repo: &dyn PagedRepository<PostWithAuthor> = state.posts.as_ref();
    let page = list_page(repo, &filter, &request).await?;

    Ok(HttpResponse::Ok().json(PageEnvelope::from_page(page, PostListItem::from)))
}

/// GET /api/posts - public listing, keyword filters title
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let filter = ListFilter::by_keyword(q.search_keyword.clone());
    list_response(&state, filter, q).await
}

/// GET /api/posts/mine - the caller's posts
pub async fn my_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let filter = ListFilter::by_keyword(q.search_keyword.clone()).owned_by(identity.user_id);
    list_response(&state, filter, q).await
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    let mut post = Post::new(identity.user_id, req.title, req.caption, req.body);
    post.tags = req.tags;

    if let Some(data_uri) = req.photo {
        let upload = DataUri::parse(&data_uri)?;
        let reference = state
            .assets
            .store(&upload.bytes, &upload.mime)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        post.photo = Some(reference);
    }

    let saved = state.posts.insert(post).await?;
    state.posts.set_categories(saved.id, &req.categories).await?;

    Ok(HttpResponse::Created().json(quill_shared::dto::PostResponse::from(saved)))
}

/// GET /api/posts/{slug} - post, author, categories, approved comment tree
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let detail = state
        .posts
        .find_detail_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post was not found".to_string()))?;

    let comments = state.comments.list_for_post(detail.post.id).await?;
    let threads = assemble_threads(comments);

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: detail.post.into(),
        author: detail.author.into(),
        categories: detail.categories.into_iter().map(Into::into).collect(),
        comments: threads.into_iter().map(CommentResponse::from_thread).collect(),
    }))
}

/// PUT /api/posts/{slug} - owner or admin
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let mut post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post was not found".to_string()))?;

    if !identity.actor().may_touch(post.user_id) {
        return Err(AppError::Forbidden);
    }

    let req = body.into_inner();

    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(AppError::BadRequest("Title must not be empty".to_string()));
        }
        post.title = title;
    }
    if let Some(caption) = req.caption {
        post.caption = Some(caption);
    }
    if let Some(new_slug) = req.slug {
        if new_slug.trim().is_empty() {
            return Err(AppError::BadRequest("Slug must not be empty".to_string()));
        }
        post.slug = new_slug;
    }
    if let Some(body_doc) = req.body {
        post.body = body_doc;
    }
    if let Some(tags) = req.tags {
        post.tags = tags;
    }

    // A new photo replaces the old one; remove_photo clears it. Either
    // way the previous asset is discarded best-effort after the update.
    let mut replaced = None;
    if let Some(data_uri) = req.photo {
        let upload = DataUri::parse(&data_uri)?;
        let reference = state
            .assets
            .store(&upload.bytes, &upload.mime)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        replaced = post.photo.replace(reference);
    } else if req.remove_photo {
        replaced = post.photo.take();
    }

    post.updated_at = chrono::Utc::now();
    let updated = state.posts.update(post).await?;

    if let Some(categories) = req.categories {
        state.posts.set_categories(updated.id, &categories).await?;
    }

    discard_asset(state.assets.as_ref(), replaced.as_deref()).await;

    Ok(HttpResponse::Ok().json(quill_shared::dto::PostResponse::from(updated)))
}

/// DELETE /api/posts/{slug} - owner or admin, cascades comments
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let report = state
        .cascade
        .delete_post(identity.actor(), &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        id: report.id,
        message: "Post is successfully deleted".to_string(),
    }))
}
