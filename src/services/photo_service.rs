// src/services/photo_service.rs
// DOCUMENTATION: Business logic for photos
// PURPOSE: Intermediary between handlers and repositories: upload-and-annotate, search, edits

use crate::db::{CommentRepository, PhotoRepository, TagRepository};
use crate::errors::PhotoError;
use crate::models::{
    merge_tags, NewPhotoRecord, NewUpload, Pagination, Photo, PhotoDetailResponse,
    PhotoListResponse, PhotoResponse, SearchQuery, UpdatePhotoRequest, User,
};
use crate::services::annotation::ImageAnalysis;
use crate::services::storage::{validate_image, UploadStore};
use crate::services::vision_client::ImageAnnotator;
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct PhotoService;

impl PhotoService {
    /// Upload-and-annotate
    /// DOCUMENTATION: validate -> store file -> annotate -> insert row and tags in one
    /// transaction. A failed annotation is logged and the photo is saved without
    /// generated alt-text or detected tags.
    pub async fn upload(
        pool: &SqlitePool,
        store: &UploadStore,
        annotator: &dyn ImageAnnotator,
        owner: &User,
        upload: NewUpload,
    ) -> Result<PhotoResponse, PhotoError> {
        let file = upload
            .file
            .ok_or_else(|| PhotoError::InvalidInput("missing file field".to_string()))?;

        let format = validate_image(
            &file.bytes,
            file.content_type.as_deref(),
            store.max_upload_bytes(),
        )?;

        let photo_id = Uuid::new_v4();
        let file_path = store.save(photo_id, format, &file.bytes).await?;

        let analysis = match annotator.annotate(&file.bytes).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                log::warn!("Annotation failed for photo {}, saving without alt-text: {}", photo_id, e);
                None
            }
        };

        let (record, tags) = Self::build_record(
            photo_id,
            owner.id,
            file_path.clone(),
            file.filename,
            format.content_type(),
            file.bytes.len() as i64,
            upload.description,
            upload.tags,
            analysis,
        );

        let photo = match Self::insert_with_tags(pool, &record, &tags).await {
            Ok(photo) => photo,
            Err(e) => {
                store.remove(&file_path).await;
                return Err(e);
            }
        };

        log::info!(
            "User {} uploaded photo {} ({} bytes, {} tags)",
            owner.username,
            photo.id,
            photo.file_size,
            tags.len()
        );

        let tags = TagRepository::tags_for_photo(pool, photo.id).await?;
        Ok(photo.to_response(tags))
    }

    /// Decide the stored description, alt-text and tags for a new photo
    #[allow(clippy::too_many_arguments)]
    fn build_record(
        id: Uuid,
        owner_id: Uuid,
        file_path: String,
        original_filename: Option<String>,
        content_type: &str,
        file_size: i64,
        user_description: Option<String>,
        user_tags: Vec<String>,
        analysis: Option<ImageAnalysis>,
    ) -> (NewPhotoRecord, Vec<String>) {
        let user_description = user_description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let (alt_text, labels, detected_text, dominant_colors) = match analysis {
            Some(a) => (Some(a.alt_text), a.labels, a.detected_text, a.dominant_colors),
            None => (None, Vec::new(), None, Vec::new()),
        };

        let description = user_description.or_else(|| alt_text.clone());
        let tags = merge_tags(user_tags, labels);

        let record = NewPhotoRecord {
            id,
            owner_id,
            file_path,
            original_filename,
            content_type: content_type.to_string(),
            file_size,
            description,
            alt_text,
            detected_text,
            dominant_colors,
        };

        (record, tags)
    }

    async fn insert_with_tags(
        pool: &SqlitePool,
        record: &NewPhotoRecord,
        tags: &[String],
    ) -> Result<Photo, PhotoError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        let photo = PhotoRepository::create_photo(&mut tx, record).await?;
        TagRepository::attach_tags(&mut tx, photo.id, tags).await?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit upload {}: {}", record.id, e);
            PhotoError::DatabaseError(e.to_string())
        })?;

        Ok(photo)
    }

    /// Attach tags to a page of photos
    async fn with_tags(pool: &SqlitePool, photos: Vec<Photo>) -> Result<Vec<PhotoResponse>, PhotoError> {
        let ids: Vec<Uuid> = photos.iter().map(|p| p.id).collect();
        let mut tags = TagRepository::tags_for_photos(pool, &ids).await?;

        Ok(photos
            .iter()
            .map(|p| p.to_response(tags.remove(&p.id).unwrap_or_default()))
            .collect())
    }

    /// Most recent uploads
    pub async fn list_photos(pool: &SqlitePool, page: Pagination) -> Result<PhotoListResponse, PhotoError> {
        let (photos, total) = PhotoRepository::list_recent(pool, page).await?;
        let data = Self::with_tags(pool, photos).await?;
        Ok(PhotoListResponse::new(data, total, page))
    }

    pub async fn list_user_photos(
        pool: &SqlitePool,
        owner_id: Uuid,
        page: Pagination,
    ) -> Result<PhotoListResponse, PhotoError> {
        let (photos, total) = PhotoRepository::list_by_owner(pool, owner_id, page).await?;
        let data = Self::with_tags(pool, photos).await?;
        Ok(PhotoListResponse::new(data, total, page))
    }

    /// Substring search over tags and descriptions; a blank query matches nothing
    pub async fn search_photos(
        pool: &SqlitePool,
        query: SearchQuery,
    ) -> Result<PhotoListResponse, PhotoError> {
        let page = Pagination::new(query.page, query.limit);
        let q = query.q.as_deref().map(str::trim).unwrap_or("");

        if q.is_empty() {
            return Ok(PhotoListResponse::empty(page));
        }

        let (photos, total) = PhotoRepository::search(pool, q, page).await?;
        let data = Self::with_tags(pool, photos).await?;
        Ok(PhotoListResponse::new(data, total, page))
    }

    pub async fn get_photo(pool: &SqlitePool, id: Uuid) -> Result<PhotoDetailResponse, PhotoError> {
        let photo = PhotoRepository::get_by_id(pool, id).await?;
        let tags = TagRepository::tags_for_photo(pool, id).await?;
        let comments = CommentRepository::list_for_photo(pool, id).await?;

        Ok(PhotoDetailResponse {
            photo: photo.to_response(tags),
            comments,
        })
    }

    /// Stored bytes and content type of a photo
    pub async fn get_photo_file(
        pool: &SqlitePool,
        store: &UploadStore,
        id: Uuid,
    ) -> Result<(Vec<u8>, String), PhotoError> {
        let photo = PhotoRepository::get_by_id(pool, id).await?;
        let bytes = store.read(&photo.file_path).await?;
        Ok((bytes, photo.content_type))
    }

    /// Owner edits description and/or tags; alt-text stays as generated
    pub async fn update_photo(
        pool: &SqlitePool,
        user: &User,
        id: Uuid,
        req: UpdatePhotoRequest,
    ) -> Result<PhotoResponse, PhotoError> {
        let photo = PhotoRepository::get_by_id(pool, id).await?;
        if photo.owner_id != user.id {
            log::warn!("User {} tried to edit photo {} they do not own", user.username, id);
            return Err(PhotoError::Forbidden);
        }

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        if let Some(description) = &req.description {
            let trimmed = description.trim();
            let value = if trimmed.is_empty() { None } else { Some(trimmed) };
            PhotoRepository::update_description(&mut tx, id, value).await?;
        }

        if let Some(tags) = req.tags {
            let tags = merge_tags(tags, std::iter::empty());
            TagRepository::replace_tags(&mut tx, id, &tags).await?;
            PhotoRepository::touch(&mut tx, id).await?;
        }

        tx.commit()
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        let photo = PhotoRepository::get_by_id(pool, id).await?;
        let tags = TagRepository::tags_for_photo(pool, id).await?;
        Ok(photo.to_response(tags))
    }

    /// Owner deletes a photo; its comments and tag links cascade, then the file is removed
    pub async fn delete_photo(
        pool: &SqlitePool,
        store: &UploadStore,
        user: &User,
        id: Uuid,
    ) -> Result<(), PhotoError> {
        let photo = PhotoRepository::get_by_id(pool, id).await?;
        if photo.owner_id != user.id {
            log::warn!("User {} tried to delete photo {} they do not own", user.username, id);
            return Err(PhotoError::Forbidden);
        }

        PhotoRepository::delete_photo(pool, id).await?;
        store.remove(&photo.file_path).await;

        log::info!("User {} deleted photo {}", user.username, id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_annotators {
    use super::*;
    use async_trait::async_trait;

    /// Always answers with the same labels
    pub struct FixedAnnotator(pub Vec<&'static str>);

    #[async_trait]
    impl ImageAnnotator for FixedAnnotator {
        async fn annotate(&self, _image: &[u8]) -> Result<ImageAnalysis, PhotoError> {
            Ok(ImageAnalysis::from_labels(&self.0))
        }
    }

    /// Always fails like a network error
    pub struct FailingAnnotator;

    #[async_trait]
    impl ImageAnnotator for FailingAnnotator {
        async fn annotate(&self, _image: &[u8]) -> Result<ImageAnalysis, PhotoError> {
            Err(PhotoError::ExternalApiError("connection refused".to_string()))
        }
    }
}
