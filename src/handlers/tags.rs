// src/handlers/tags.rs

use crate::db::TagRepository;
use crate::errors::PhotoError;
use actix_web::{web, HttpResponse, Responder};
use sqlx::SqlitePool;

/// GET /tags
/// Every tag with its photo count, most used first
pub async fn list_tags(pool: web::Data<SqlitePool>) -> Result<impl Responder, PhotoError> {
    let tags = TagRepository::list_with_counts(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(tags))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/tags", web::get().to(list_tags));
}
