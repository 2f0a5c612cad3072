// src/handlers/users.rs
// DOCUMENTATION: HTTP handlers for user profiles and account removal

use crate::errors::PhotoError;
use crate::handlers::auth::authenticated_user;
use crate::models::{ListQuery, Pagination};
use crate::services::{PhotoService, UploadStore, UserService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::SqlitePool;
use uuid::Uuid;

/// GET /users/{id}
pub async fn get_user(
    pool: web::Data<SqlitePool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PhotoError> {
    let profile = UserService::get_profile(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /users/{id}/photos
pub async fn get_user_photos(
    pool: web::Data<SqlitePool>,
    path: web::Path<Uuid>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, PhotoError> {
    let user_id = path.into_inner();
    // 404 for unknown users rather than an empty page
    UserService::get_profile(pool.get_ref(), user_id).await?;

    let page = Pagination::new(query.page, query.limit);
    let result = PhotoService::list_user_photos(pool.get_ref(), user_id, page).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /users/me
/// Removes the caller's account, photos, comments and stored files
pub async fn delete_me(
    pool: web::Data<SqlitePool>,
    store: web::Data<UploadStore>,
    req: HttpRequest,
) -> Result<impl Responder, PhotoError> {
    let user = authenticated_user(&req, pool.get_ref()).await?;
    UserService::delete_account(pool.get_ref(), store.get_ref(), &user).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/me", web::delete().to(delete_me))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}/photos", web::get().to(get_user_photos)),
    );
}
