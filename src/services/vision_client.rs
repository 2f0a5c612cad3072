// src/services/vision_client.rs
// DOCUMENTATION: Google Cloud Vision API client
// PURPOSE: Send uploaded image bytes to images:annotate and turn the reply into an ImageAnalysis

use crate::config::Config;
use crate::errors::PhotoError;
use crate::services::annotation::ImageAnalysis;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Anything that can describe an image
/// DOCUMENTATION: The upload flow only talks to this trait, so tests swap in a fake
#[async_trait]
pub trait ImageAnnotator: Send + Sync {
    async fn annotate(&self, image: &[u8]) -> Result<ImageAnalysis, PhotoError>;
}

/// How requests to the vision API are authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionCredentials {
    /// Sent as the `key` query parameter
    ApiKey(String),
    /// Sent as `Authorization: Bearer`
    AccessToken(String),
}

/// On-disk shape of the credentials file
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    api_key: Option<String>,
    access_token: Option<String>,
}

impl VisionCredentials {
    /// Load credentials from the JSON file named by GOOGLE_APPLICATION_CREDENTIALS
    pub fn from_file(path: &Path) -> Result<Self, PhotoError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PhotoError::ExternalApiError(format!(
                "cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, PhotoError> {
        let file: CredentialsFile = serde_json::from_str(raw)
            .map_err(|e| PhotoError::ExternalApiError(format!("malformed credentials: {}", e)))?;

        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        if let Some(key) = non_empty(file.api_key) {
            Ok(VisionCredentials::ApiKey(key))
        } else if let Some(token) = non_empty(file.access_token) {
            Ok(VisionCredentials::AccessToken(token))
        } else {
            Err(PhotoError::ExternalApiError(
                "credentials file has neither api_key nor access_token".to_string(),
            ))
        }
    }
}

/// Batch request body for images:annotate
#[derive(Debug, Serialize)]
pub struct BatchAnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateImageRequest {
    pub image: VisionImage,
    pub features: Vec<VisionFeature>,
}

/// Inline image payload (base64)
#[derive(Debug, Serialize)]
pub struct VisionImage {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionFeature {
    #[serde(rename = "type")]
    pub feature_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

/// Batch response from images:annotate
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BatchAnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

/// Per-image annotations
/// DOCUMENTATION: Every list may be absent when the API found nothing
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotateImageResponse {
    pub label_annotations: Vec<EntityAnnotation>,
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    pub text_annotations: Vec<EntityAnnotation>,
    pub landmark_annotations: Vec<EntityAnnotation>,
    pub logo_annotations: Vec<EntityAnnotation>,
    pub image_properties_annotation: Option<ImageProperties>,
    pub error: Option<VisionStatus>,
}

/// Label, text, landmark or logo
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityAnnotation {
    pub description: String,
    pub score: f32,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizedObjectAnnotation {
    pub name: String,
    pub score: f32,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProperties {
    pub dominant_colors: DominantColorsAnnotation,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DominantColorsAnnotation {
    pub colors: Vec<ColorInfo>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorInfo {
    pub color: VisionColor,
    pub score: f32,
    pub pixel_fraction: f32,
}

/// Channels are floats in 0..=255; absent channels are zero
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// Error status embedded in a per-image response
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionStatus {
    pub code: i32,
    pub message: String,
}

/// Features requested for every upload
fn annotate_features(max_labels: u32) -> Vec<VisionFeature> {
    vec![
        VisionFeature { feature_type: "LABEL_DETECTION", max_results: Some(max_labels) },
        VisionFeature { feature_type: "OBJECT_LOCALIZATION", max_results: Some(max_labels) },
        VisionFeature { feature_type: "TEXT_DETECTION", max_results: Some(1) },
        VisionFeature { feature_type: "LANDMARK_DETECTION", max_results: Some(5) },
        VisionFeature { feature_type: "LOGO_DETECTION", max_results: Some(5) },
        VisionFeature { feature_type: "IMAGE_PROPERTIES", max_results: None },
    ]
}

/// Google Cloud Vision client
/// DOCUMENTATION: One annotate call per image, no retries
pub struct GoogleVisionClient {
    /// HTTP client for making requests
    client: Client,
    credentials: VisionCredentials,
    /// images:annotate URL
    endpoint: String,
    max_labels: usize,
    score_threshold: f32,
}

impl GoogleVisionClient {
    /// Create new Vision API client
    pub fn new(credentials: VisionCredentials, config: &Config) -> Result<Self, PhotoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.vision_timeout_secs))
            .build()
            .map_err(|e| PhotoError::ExternalApiError(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            endpoint: config.vision_endpoint.clone(),
            max_labels: config.vision_max_labels,
            score_threshold: config.vision_score_threshold,
        })
    }

    /// Build the request body for one image
    pub fn build_request(&self, image: &[u8]) -> BatchAnnotateRequest {
        BatchAnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: VisionImage {
                    content: STANDARD.encode(image),
                },
                features: annotate_features(self.max_labels as u32),
            }],
        }
    }

    /// Call images:annotate and return the raw per-image response
    pub async fn annotate_raw(&self, image: &[u8]) -> Result<AnnotateImageResponse, PhotoError> {
        let body = self.build_request(image);

        let request = self.client.post(&self.endpoint).json(&body);
        let request = match &self.credentials {
            VisionCredentials::ApiKey(key) => request.query(&[("key", key)]),
            VisionCredentials::AccessToken(token) => request.bearer_auth(token),
        };

        log::debug!("Vision annotate request: {} bytes", image.len());

        let response = request.send().await.map_err(|e| {
            log::error!("Vision API request failed: {}", e);
            PhotoError::ExternalApiError(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PhotoError::ExternalApiError("Vision API quota exceeded".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Vision API error {}: {}", status, body);
            return Err(PhotoError::ExternalApiError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let batch: BatchAnnotateResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse Vision API response: {}", e);
            PhotoError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        let first = batch
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| PhotoError::ExternalApiError("empty annotate response".to_string()))?;

        if let Some(err) = &first.error {
            if err.code != 0 {
                return Err(PhotoError::ExternalApiError(format!(
                    "annotate error {}: {}",
                    err.code, err.message
                )));
            }
        }

        Ok(first)
    }
}

#[async_trait]
impl ImageAnnotator for GoogleVisionClient {
    async fn annotate(&self, image: &[u8]) -> Result<ImageAnalysis, PhotoError> {
        let response = self.annotate_raw(image).await?;
        let analysis = ImageAnalysis::from_response(&response, self.max_labels, self.score_threshold);

        log::info!(
            "Vision annotation: {} labels, alt text {:?}",
            analysis.labels.len(),
            analysis.alt_text
        );
        Ok(analysis)
    }
}

/// Stand-in used when no credentials are configured
/// Every call fails, which sends uploads down the unannotated path
pub struct UnconfiguredAnnotator;

#[async_trait]
impl ImageAnnotator for UnconfiguredAnnotator {
    async fn annotate(&self, _image: &[u8]) -> Result<ImageAnalysis, PhotoError> {
        Err(PhotoError::ExternalApiError(
            "vision client not configured".to_string(),
        ))
    }
}

/// Pick the annotator for this configuration
pub fn build_annotator(config: &Config) -> Arc<dyn ImageAnnotator> {
    let path = match &config.google_credentials_path {
        Some(path) => path,
        None => {
            log::warn!("Google credentials not found - image annotation disabled");
            return Arc::new(UnconfiguredAnnotator);
        }
    };

    let client = VisionCredentials::from_file(path)
        .and_then(|credentials| GoogleVisionClient::new(credentials, config));

    match client {
        Ok(client) => {
            log::info!("Vision client initialized ({})", config.vision_endpoint);
            Arc::new(client)
        }
        Err(e) => {
            log::error!("Error initializing Vision client: {}", e);
            Arc::new(UnconfiguredAnnotator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_credentials_parsing() {
        assert_eq!(
            VisionCredentials::from_json(r#"{"api_key": "abc"}"#).unwrap(),
            VisionCredentials::ApiKey("abc".into())
        );
        assert_eq!(
            VisionCredentials::from_json(r#"{"access_token": "tok", "api_key": ""}"#).unwrap(),
            VisionCredentials::AccessToken("tok".into())
        );
        assert!(VisionCredentials::from_json(r#"{"type": "service_account"}"#).is_err());
        assert!(VisionCredentials::from_json("not json").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let client = GoogleVisionClient::new(
            VisionCredentials::ApiKey("k".into()),
            &Config::default(),
        )
        .unwrap();

        let body = serde_json::to_value(client.build_request(b"abc")).unwrap();
        let request = &body["requests"][0];
        assert_eq!(request["image"]["content"], "YWJj");
        assert_eq!(request["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(request["features"][0]["maxResults"], 10);
        assert!(request["features"][5].get("maxResults").is_none());
    }

    #[test]
    fn test_response_parsing_with_missing_fields() {
        let raw = r#"{
            "responses": [{
                "labelAnnotations": [{"description": "Dog", "score": 0.97}],
                "imagePropertiesAnnotation": {
                    "dominantColors": {"colors": [{"color": {"red": 200, "green": 10}, "score": 0.4}]}
                }
            }]
        }"#;

        let parsed: BatchAnnotateResponse = serde_json::from_str(raw).unwrap();
        let first = &parsed.responses[0];
        assert_eq!(first.label_annotations[0].description, "Dog");
        assert!(first.landmark_annotations.is_empty());
        let colors = &first.image_properties_annotation.as_ref().unwrap().dominant_colors.colors;
        assert_eq!(colors[0].color.blue, 0.0);
    }

    #[tokio::test]
    async fn test_unconfigured_annotator_fails() {
        let annotator = build_annotator(&Config::default());
        assert!(matches!(
            annotator.annotate(b"bytes").await,
            Err(PhotoError::ExternalApiError(_))
        ));
    }

    #[tokio::test]
    async fn test_build_annotator_from_credentials_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "test-key"}}"#).unwrap();

        let config = Config {
            google_credentials_path: Some(file.path().to_path_buf()),
            // Nothing listens here, so the call fails fast
            vision_endpoint: "http://127.0.0.1:9/v1/images:annotate".to_string(),
            vision_timeout_secs: 2,
            ..Config::default()
        };

        let annotator = build_annotator(&config);
        let err = annotator.annotate(b"bytes").await.unwrap_err();
        match err {
            PhotoError::ExternalApiError(msg) => assert!(msg.starts_with("Request failed")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
