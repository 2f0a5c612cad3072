// src/handlers/comments.rs
// DOCUMENTATION: HTTP handlers for comments
// PURPOSE: Listing and posting live under /photos/{id}/comments, deletion under /comments

use crate::errors::PhotoError;
use crate::handlers::auth::authenticated_user;
use crate::models::CreateCommentRequest;
use crate::services::CommentService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// GET /photos/{id}/comments
/// Oldest first
pub async fn list_comments(
    pool: web::Data<SqlitePool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PhotoError> {
    let comments = CommentService::list_comments(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /photos/{id}/comments
pub async fn add_comment(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> Result<impl Responder, PhotoError> {
    let user = authenticated_user(&req, pool.get_ref()).await?;
    if let Err(e) = body.validate() {
        return Err(PhotoError::ValidationError(e.to_string()));
    }

    let comment =
        CommentService::add_comment(pool.get_ref(), &user, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PhotoError> {
    let user = authenticated_user(&req, pool.get_ref()).await?;
    CommentService::delete_comment(pool.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/comments").route("/{id}", web::delete().to(delete_comment)));
}
