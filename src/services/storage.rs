// src/services/storage.rs
// DOCUMENTATION: Upload validation and on-disk storage
// PURPOSE: Check uploaded bytes are an accepted image and keep them in the upload directory

use crate::errors::PhotoError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Identify the format from the file content, ignoring what the client declared
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let kind = infer::get(bytes)?;
        if kind.matcher_type() != infer::MatcherType::Image {
            return None;
        }

        match kind.mime_type() {
            "image/jpeg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            other => {
                log::debug!("Rejecting image content of type {}", other);
                None
            }
        }
    }

    /// Map a declared content type to a format
    pub fn from_mime(mime: &mime::Mime) -> Option<Self> {
        if mime.type_() != mime::IMAGE {
            return None;
        }
        match mime.subtype().as_str() {
            "jpeg" | "jpg" | "pjpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// Check an upload against the size limit and the accepted types
/// DOCUMENTATION: The declared type must be an accepted image type and the
/// content must actually be that format
pub fn validate_image(
    bytes: &[u8],
    declared: Option<&str>,
    max_bytes: usize,
) -> Result<ImageFormat, PhotoError> {
    if bytes.is_empty() {
        return Err(PhotoError::InvalidInput("uploaded file is empty".to_string()));
    }

    if bytes.len() > max_bytes {
        return Err(PhotoError::PayloadTooLarge(max_bytes));
    }

    let declared = declared.unwrap_or("application/octet-stream");
    let declared_format = declared
        .parse::<mime::Mime>()
        .ok()
        .and_then(|m| ImageFormat::from_mime(&m))
        .ok_or_else(|| PhotoError::UnsupportedMediaType(declared.to_string()))?;

    match ImageFormat::sniff(bytes) {
        Some(actual) if actual == declared_format => Ok(actual),
        Some(actual) => Err(PhotoError::UnsupportedMediaType(format!(
            "declared {} but content is {}",
            declared,
            actual.content_type()
        ))),
        None => Err(PhotoError::UnsupportedMediaType(format!(
            "content is not a recognized image (declared {})",
            declared
        ))),
    }
}

/// Local upload directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_upload_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_upload_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Create the upload directory if needed
    pub async fn ensure_root(&self) -> Result<(), PhotoError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            log::error!("Cannot create upload dir {}: {}", self.root.display(), e);
            PhotoError::StorageError(format!("create upload dir: {}", e))
        })
    }

    /// Write the bytes as `<id>.<ext>` and return the stored file name
    pub async fn save(&self, id: Uuid, format: ImageFormat, bytes: &[u8]) -> Result<String, PhotoError> {
        self.ensure_root().await?;

        let file_name = format!("{}.{}", id, format.extension());
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            log::error!("Failed to write upload {}: {}", path.display(), e);
            PhotoError::StorageError(format!("write upload: {}", e))
        })?;

        log::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(file_name)
    }

    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, PhotoError> {
        let path = self.resolve(file_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PhotoError::NotFound(format!("file {}", file_name)))
            }
            Err(e) => {
                log::error!("Failed to read upload {}: {}", path.display(), e);
                Err(PhotoError::StorageError(format!("read upload: {}", e)))
            }
        }
    }

    /// Best-effort delete; a missing file is not an error
    pub async fn remove(&self, file_name: &str) {
        let path = match self.resolve(file_name) {
            Ok(path) => path,
            Err(_) => return,
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::debug!("Removed upload {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove upload {}: {}", path.display(), e),
        }
    }

    /// Stored names are plain file names; anything with a path component is rejected
    fn resolve(&self, file_name: &str) -> Result<PathBuf, PhotoError> {
        let plain = Path::new(file_name)
            .file_name()
            .map(|n| n == file_name)
            .unwrap_or(false);

        if !plain {
            return Err(PhotoError::InvalidInput(format!("bad file name {}", file_name)));
        }

        Ok(self.root.join(file_name))
    }
}

/// Smallest valid PNG (1x1, transparent), used for demo data
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];
