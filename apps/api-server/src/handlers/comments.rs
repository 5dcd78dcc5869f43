//! Comment handlers: create (unapproved), edit/moderate, cascade delete.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Comment;
use quill_core::ports::{BaseRepository, PostRepository};
use quill_shared::dto::{
    CommentResponse, CreateCommentRequest, DeleteResponse, UpdateCommentRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/comments - comment on a post (by slug), optionally as a reply
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.body.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Comment body must not be empty".to_string(),
        ));
    }

    let post = state
        .posts
        .find_by_slug(&req.slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post was not found".to_string()))?;

    if let Some(parent_id) = req.parent_id {
        let parent = state
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment was not found".to_string()))?;

        if parent.post_id != post.id {
            return Err(AppError::BadRequest(
                "Parent comment belongs to another post".to_string(),
            ));
        }
        if parent.parent_id.is_some() {
            return Err(AppError::BadRequest(
                "Replies cannot be nested further".to_string(),
            ));
        }
    }

    let comment = Comment::new(
        identity.user_id,
        post.id,
        req.body,
        req.parent_id,
        req.reply_to_user_id,
    );
    let saved = state.comments.insert(comment).await?;

    Ok(HttpResponse::Created().json(CommentResponse::bare(saved)))
}

/// PUT /api/comments/{comment_id} - author edits; admins also moderate
pub async fn update_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let mut comment = state
        .comments
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Comment was not found".to_string()))?;

    if !identity.actor().may_touch(comment.user_id) {
        return Err(AppError::Forbidden);
    }

    let req = body.into_inner();

    if let Some(approved) = req.approved {
        if !identity.is_admin() {
            return Err(AppError::Forbidden);
        }
        comment.approved = approved;
    }
    if let Some(text) = req.body {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Comment body must not be empty".to_string(),
            ));
        }
        comment.body = text;
    }

    comment.updated_at = chrono::Utc::now();
    let updated = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(CommentResponse::bare(updated)))
}

/// DELETE /api/comments/{comment_id} - author or admin, cascades replies
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let report = state
        .cascade
        .delete_comment(identity.actor(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        id: report.id,
        message: "Comment is successfully deleted".to_string(),
    }))
}
