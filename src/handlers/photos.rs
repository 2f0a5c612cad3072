// src/handlers/photos.rs
// DOCUMENTATION: HTTP handlers for photo operations
// PURPOSE: Parse requests (JSON, query strings, multipart), call services, return responses

use crate::errors::PhotoError;
use crate::handlers::auth::authenticated_user;
use crate::handlers::comments;
use crate::models::{
    parse_tag_list, ListQuery, NewUpload, Pagination, SearchQuery, UpdatePhotoRequest,
    UploadedFile,
};
use crate::services::{ImageAnnotator, PhotoService, UploadStore};
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::{StreamExt, TryStreamExt};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Cap on the `description` and `tags` form fields
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

/// Longest accepted description, in characters
const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Read one multipart field, failing once it grows past `limit`
async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, PhotoError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| PhotoError::InvalidInput(format!("multipart: {}", e)))?;
        if bytes.len() + chunk.len() > limit {
            return Err(PhotoError::PayloadTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text_field(field: &mut Field, name: &str) -> Result<String, PhotoError> {
    let bytes = read_field(field, MAX_TEXT_FIELD_BYTES).await?;
    String::from_utf8(bytes)
        .map_err(|_| PhotoError::InvalidInput(format!("field {} is not valid UTF-8", name)))
}

/// Collect the `file`, `description` and `tags` parts of an upload form
/// Unknown parts are drained and ignored
pub async fn read_upload(mut payload: Multipart, max_upload_bytes: usize) -> Result<NewUpload, PhotoError> {
    let mut upload = NewUpload::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| PhotoError::InvalidInput(format!("multipart: {}", e)))?
    {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(str::to_string);

        match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(|m| m.to_string());
                let bytes = read_field(&mut field, max_upload_bytes).await?;
                upload.file = Some(UploadedFile {
                    bytes,
                    filename,
                    content_type,
                });
            }
            "description" => {
                let text = read_text_field(&mut field, "description").await?;
                if text.chars().count() > MAX_DESCRIPTION_CHARS {
                    return Err(PhotoError::ValidationError(format!(
                        "description longer than {} characters",
                        MAX_DESCRIPTION_CHARS
                    )));
                }
                upload.description = Some(text);
            }
            "tags" => {
                let text = read_text_field(&mut field, "tags").await?;
                upload.tags = parse_tag_list(&text);
            }
            other => {
                log::debug!("Ignoring multipart field {:?}", other);
                read_field(&mut field, MAX_TEXT_FIELD_BYTES).await?;
            }
        }
    }

    Ok(upload)
}

/// POST /photos
/// Multipart upload; the image is annotated before the row is written
pub async fn upload_photo(
    pool: web::Data<SqlitePool>,
    store: web::Data<UploadStore>,
    annotator: web::Data<Arc<dyn ImageAnnotator>>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<impl Responder, PhotoError> {
    let user = authenticated_user(&req, pool.get_ref()).await?;
    let upload = read_upload(payload, store.max_upload_bytes()).await?;

    let photo = PhotoService::upload(
        pool.get_ref(),
        store.get_ref(),
        annotator.get_ref().as_ref(),
        &user,
        upload,
    )
    .await?;

    Ok(HttpResponse::Created().json(photo))
}

/// GET /photos
/// Newest first
pub async fn list_photos(
    pool: web::Data<SqlitePool>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, PhotoError> {
    let page = Pagination::new(query.page, query.limit);
    let result = PhotoService::list_photos(pool.get_ref(), page).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /photos/search?q=
pub async fn search_photos(
    pool: web::Data<SqlitePool>,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, PhotoError> {
    log::debug!("Photo search: {:?}", query.q);
    let result = PhotoService::search_photos(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /photos/{id}
pub async fn get_photo(
    pool: web::Data<SqlitePool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PhotoError> {
    let detail = PhotoService::get_photo(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /photos/{id}/file
pub async fn get_photo_file(
    pool: web::Data<SqlitePool>,
    store: web::Data<UploadStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PhotoError> {
    let (bytes, content_type) =
        PhotoService::get_photo_file(pool.get_ref(), store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}

/// PUT /photos/{id}
pub async fn update_photo(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePhotoRequest>,
) -> Result<impl Responder, PhotoError> {
    let user = authenticated_user(&req, pool.get_ref()).await?;
    if let Err(e) = body.validate() {
        return Err(PhotoError::ValidationError(e.to_string()));
    }

    let photo =
        PhotoService::update_photo(pool.get_ref(), &user, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(photo))
}

/// DELETE /photos/{id}
pub async fn delete_photo(
    pool: web::Data<SqlitePool>,
    store: web::Data<UploadStore>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PhotoError> {
    let user = authenticated_user(&req, pool.get_ref()).await?;
    PhotoService::delete_photo(pool.get_ref(), store.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for photo routes
/// `/search` is registered before `/{id}` so it is not parsed as an id
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/photos")
            .route("", web::get().to(list_photos))
            .route("", web::post().to(upload_photo))
            .route("/search", web::get().to(search_photos))
            .route("/{id}", web::get().to(get_photo))
            .route("/{id}", web::put().to(update_photo))
            .route("/{id}", web::delete().to(delete_photo))
            .route("/{id}/file", web::get().to(get_photo_file))
            .route("/{id}/comments", web::get().to(comments::list_comments))
            .route("/{id}/comments", web::post().to(comments::add_comment)),
    );
}
