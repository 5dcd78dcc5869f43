//! Category handlers: admin-managed taxonomy with a public listing.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Category;
use quill_core::filter::ListFilter;
use quill_core::pagination::PageRequest;
use quill_core::ports::{BaseRepository, CategoryRepository, PagedRepository};
use quill_core::services::list_page;
use quill_shared::dto::{
    CategoryRequest, CategoryResponse, DeleteResponse, ListQuery, PageEnvelope,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;

/// GET /api/categories - public listing, keyword filters title
pub async fn list_categories(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let filter = ListFilter::by_keyword(q.search_keyword);
    let request = PageRequest::new(q.page.unwrap_or(1), q.limit.unwrap_or(DEFAULT_PAGE_SIZE));

    let repo: &dyn PagedRepository<Category> = state.categories.as_ref();
    let page = list_page(repo, &filter, &request).await?;

    Ok(HttpResponse::Ok().json(PageEnvelope::from_page(page, CategoryResponse::from)))
}

/// GET /api/categories/{category_id}
pub async fn get_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Category was not found".to_string()))?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// POST /api/categories - admin
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden);
    }

    let req = body.into_inner();
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    if state.categories.find_by_title(&req.title).await?.is_some() {
        return Err(AppError::Conflict("Category already exists".to_string()));
    }

    let saved = state.categories.insert(Category::new(req.title)).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(saved)))
}

/// PUT /api/categories/{category_id} - admin
pub async fn update_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden);
    }

    let mut category = state
        .categories
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Category was not found".to_string()))?;

    let req = body.into_inner();
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    category.title = req.title;
    category.updated_at = chrono::Utc::now();
    let updated = state.categories.update(category).await?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(updated)))
}

/// DELETE /api/categories/{category_id} - admin, detaches from posts
pub async fn delete_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let report = state
        .cascade
        .delete_category(identity.actor(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        id: report.id,
        message: "Category is successfully deleted".to_string(),
    }))
}
