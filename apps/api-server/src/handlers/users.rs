//! User handlers: registration, login, profile, avatar, admin listing,
//! cascade delete.

use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use quill_core::domain::User;
use quill_core::filter::ListFilter;
use quill_core::media::DataUri;
use quill_core::pagination::PageRequest;
use quill_core::ports::{
    BaseRepository, PagedRepository, PasswordService, TokenService, UserRepository,
};
use quill_core::services::{discard_asset, list_page};
use quill_shared::dto::{
    AuthUserResponse, DeleteResponse, ListQuery, LoginRequest, PageEnvelope, RegisterRequest,
    UpdateAvatarRequest, UpdateProfileRequest, UserSummary,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MIN_PASSWORD_LEN: usize = 8;

fn issue_token(token_service: &dyn TokenService, user: &User) -> AppResult<String> {
    token_service
        .generate_token(user.id, &user.email, user.roles())
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// POST /api/users/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check if user already exists
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    // Hash password
    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Create user
    let user = User::new(req.name, req.email, password_hash);
    let saved = state.users.insert(user).await?;

    let token = issue_token(token_service.get_ref().as_ref(), &saved)?;
    Ok(HttpResponse::Created().json(AuthUserResponse::new(&saved, token)))
}

/// POST /api/users/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(token_service.get_ref().as_ref(), &user)?;
    Ok(HttpResponse::Ok().json(AuthUserResponse::new(&user, token)))
}

/// GET /api/users/profile - Protected route
pub async fn profile(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User was not found".to_string()))?;

    let token = issue_token(token_service.get_ref().as_ref(), &user)?;
    Ok(HttpResponse::Ok().json(AuthUserResponse::new(&user, token)))
}

/// PUT /api/users/{user_id} - self or admin
pub async fn update_profile(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let target_id = path.into_inner();
    if !identity.is_admin() && identity.user_id != target_id {
        return Err(AppError::Forbidden);
    }

    let mut user = state
        .users
        .find_by_id(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User was not found".to_string()))?;

    let req = body.into_inner();

    // The admin flag is only honored when an admin sends it.
    if let Some(admin) = req.admin {
        if identity.is_admin() {
            user.admin = admin;
        }
    }
    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name must not be empty".to_string()));
        }
        user.name = name;
    }
    if let Some(email) = req.email {
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        user.email = email;
    }
    if let Some(password) = req.password {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        user.password_hash = password_service
            .hash(&password)
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    user.updated_at = chrono::Utc::now();
    let updated = state.users.update(user).await?;

    let token = issue_token(token_service.get_ref().as_ref(), &updated)?;
    Ok(HttpResponse::Ok().json(AuthUserResponse::new(&updated, token)))
}

/// PUT /api/users/avatar - upload or clear the caller's avatar
pub async fn update_avatar(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    identity: Identity,
    body: web::Json<UpdateAvatarRequest>,
) -> AppResult<HttpResponse> {
    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User was not found".to_string()))?;

    let previous = user.avatar.take();

    if let Some(data_uri) = body.into_inner().avatar {
        let upload = DataUri::parse(&data_uri)?;
        let reference = state
            .assets
            .store(&upload.bytes, &upload.mime)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        user.avatar = Some(reference);
    }

    user.updated_at = chrono::Utc::now();
    let updated = state.users.update(user).await?;

    // The old avatar is unreachable now; dropping it is best-effort.
    discard_asset(state.assets.as_ref(), previous.as_deref()).await;

    let token = issue_token(token_service.get_ref().as_ref(), &updated)?;
    Ok(HttpResponse::Ok().json(AuthUserResponse::new(&updated, token)))
}

/// GET /api/users - admin listing, keyword filters email
pub async fn list_users(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden);
    }

    let q = query.into_inner();
    let filter = ListFilter::by_keyword(q.search_keyword);
    let request = PageRequest::new(q.page.unwrap_or(1), q.limit.unwrap_or(DEFAULT_PAGE_SIZE));

    let repo: &dyn PagedRepository<User> = state.users.as_ref();
    let page = list_page(repo, &filter, &request).await?;

    Ok(HttpResponse::Ok().json(PageEnvelope::from_page(page, UserSummary::from)))
}

/// DELETE /api/users/{user_id} - admin, cascades posts and comments
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let report = state
        .cascade
        .delete_user(identity.actor(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        id: report.id,
        message: "User is deleted successfully".to_string(),
    }))
}
