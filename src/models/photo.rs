// src/models/photo.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::CommentResponse;

/// Default page size for listings and search
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// One dominant color reported by the vision API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub score: f32,
}

/// Uploaded photo row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// File name relative to the upload directory
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub file_size: i64,
    /// User supplied text, or the generated alt-text when none was given
    pub description: Option<String>,
    /// Written once at upload time from the vision labels
    pub alt_text: Option<String>,
    pub detected_text: Option<String>,
    pub dominant_colors: Option<Json<Vec<DominantColor>>>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values inserted for a new photo
#[derive(Debug, Clone)]
pub struct NewPhotoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub file_size: i64,
    pub description: Option<String>,
    pub alt_text: Option<String>,
    pub detected_text: Option<String>,
    pub dominant_colors: Vec<DominantColor>,
}

/// File part of a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    /// Content type declared by the client for the part
    pub content_type: Option<String>,
}

/// Parsed multipart upload form
#[derive(Debug, Clone, Default)]
pub struct NewUpload {
    pub file: Option<UploadedFile>,
    pub description: Option<String>,
    /// Already normalized tag names
    pub tags: Vec<String>,
}

/// PUT /photos/{id} body
/// Absent fields are left unchanged; an empty description clears it
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct UpdatePhotoRequest {
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub tags: Option<Vec<String>>,
}

/// Query string for listings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListQuery {
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Results per page (max 100)
    pub limit: Option<i64>,
}

/// Query string for GET /photos/search
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchQuery {
    /// Free text matched against tags and descriptions
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Photo DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_url: String,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub file_size: i64,
    pub description: Option<String>,
    pub alt_text: Option<String>,
    pub detected_text: Option<String>,
    pub dominant_colors: Vec<DominantColor>,
    pub tags: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GET /photos/{id} response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoDetailResponse {
    pub photo: PhotoResponse,
    pub comments: Vec<CommentResponse>,
}

/// Paginated photo listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoListResponse {
    pub data: Vec<PhotoResponse>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

impl PhotoListResponse {
    pub fn new(data: Vec<PhotoResponse>, total_count: i64, pagination: Pagination) -> Self {
        Self {
            data,
            total_count,
            page: pagination.page,
            limit: pagination.limit,
            has_more: total_count > pagination.page.saturating_mul(pagination.limit),
        }
    }

    pub fn empty(pagination: Pagination) -> Self {
        Self::new(Vec::new(), 0, pagination)
    }
}

impl Photo {
    /// Convert database photo into API response DTO
    pub fn to_response(&self, tags: Vec<String>) -> PhotoResponse {
        PhotoResponse {
            id: self.id,
            owner_id: self.owner_id,
            file_url: format!("/photos/{}/file", self.id),
            original_filename: self.original_filename.clone(),
            content_type: self.content_type.clone(),
            file_size: self.file_size,
            description: self.description.clone(),
            alt_text: self.alt_text.clone(),
            detected_text: self.detected_text.clone(),
            dominant_colors: self
                .dominant_colors
                .as_ref()
                .map(|c| c.0.clone())
                .unwrap_or_default(),
            tags,
            uploaded_at: self.uploaded_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(None, None);
        assert_eq!(p, Pagination { page: 1, limit: DEFAULT_PAGE_SIZE });
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(Some(0), Some(1000));
        assert_eq!(p, Pagination { page: 1, limit: MAX_PAGE_SIZE });

        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_has_more() {
        let page = Pagination::new(Some(1), Some(2));
        assert!(PhotoListResponse::new(Vec::new(), 3, page).has_more);
        assert!(!PhotoListResponse::new(Vec::new(), 2, page).has_more);
        assert!(!PhotoListResponse::empty(page).has_more);
    }

    #[test]
    fn test_huge_page_saturates() {
        let page = Pagination::new(Some(i64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(page.offset(), i64::MAX);
        assert!(!PhotoListResponse::new(Vec::new(), 5, page).has_more);
    }
}
