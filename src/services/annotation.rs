// src/services/annotation.rs
// DOCUMENTATION: Turning vision annotations into alt-text and tags
// PURPOSE: Pure functions over AnnotateImageResponse, kept apart from the HTTP client

use crate::models::DominantColor;
use crate::services::vision_client::AnnotateImageResponse;
use serde::{Deserialize, Serialize};

/// Alt-text used when the API found nothing to describe
pub const DEFAULT_ALT_TEXT: &str = "Image uploaded by user";

/// Labels that make it into the alt-text sentence
const ALT_TEXT_LABELS: usize = 3;

/// Colors kept per photo
const MAX_COLORS: usize = 3;

/// What the upload flow stores from one annotate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub alt_text: String,
    /// Lowercased, deduplicated, most relevant first
    pub labels: Vec<String>,
    pub detected_text: Option<String>,
    pub dominant_colors: Vec<DominantColor>,
}

impl ImageAnalysis {
    /// Analysis built from plain labels, with no landmark, text or colors
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let labels: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        Self {
            alt_text: build_alt_text(&[], &labels),
            labels: dedupe_lowercase(labels),
            detected_text: None,
            dominant_colors: Vec::new(),
        }
    }

    pub fn from_response(
        response: &AnnotateImageResponse,
        max_labels: usize,
        score_threshold: f32,
    ) -> Self {
        let landmarks: Vec<String> = response
            .landmark_annotations
            .iter()
            .map(|l| l.description.clone())
            .collect();
        let top_labels: Vec<String> = response
            .label_annotations
            .iter()
            .map(|l| l.description.clone())
            .collect();

        let mut labels = extract_labels(response, score_threshold);
        labels.truncate(max_labels);

        let detected_text = response
            .text_annotations
            .first()
            .map(|t| t.description.trim().to_string())
            .filter(|t| !t.is_empty());

        Self {
            alt_text: build_alt_text(&landmarks, &top_labels),
            labels,
            detected_text,
            dominant_colors: extract_colors(response),
        }
    }
}

/// Alt-text sentence: the first landmark if any, otherwise the top labels
pub fn build_alt_text(landmarks: &[String], labels: &[String]) -> String {
    if let Some(landmark) = landmarks.iter().find(|l| !l.trim().is_empty()) {
        return landmark.trim().to_string();
    }

    let top: Vec<&str> = labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .take(ALT_TEXT_LABELS)
        .collect();

    if top.is_empty() {
        DEFAULT_ALT_TEXT.to_string()
    } else {
        format!("Image containing {}", top.join(", "))
    }
}

/// Searchable labels in priority order: confident labels, confident objects,
/// then every landmark and logo
pub fn extract_labels(response: &AnnotateImageResponse, score_threshold: f32) -> Vec<String> {
    let labels = response
        .label_annotations
        .iter()
        .filter(|l| l.score > score_threshold)
        .map(|l| l.description.clone());
    let objects = response
        .localized_object_annotations
        .iter()
        .filter(|o| o.score > score_threshold)
        .map(|o| o.name.clone());
    let landmarks = response
        .landmark_annotations
        .iter()
        .map(|l| l.description.clone());
    let logos = response.logo_annotations.iter().map(|l| l.description.clone());

    dedupe_lowercase(labels.chain(objects).chain(landmarks).chain(logos))
}

fn dedupe_lowercase<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim().to_lowercase();
        if !item.is_empty() && !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

fn extract_colors(response: &AnnotateImageResponse) -> Vec<DominantColor> {
    let colors = match &response.image_properties_annotation {
        Some(props) => &props.dominant_colors.colors,
        None => return Vec::new(),
    };

    colors
        .iter()
        .take(MAX_COLORS)
        .map(|c| DominantColor {
            red: c.color.red.clamp(0.0, 255.0).round() as u8,
            green: c.color.green.clamp(0.0, 255.0).round() as u8,
            blue: c.color.blue.clamp(0.0, 255.0).round() as u8,
            score: c.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::vision_client::{
        ColorInfo, DominantColorsAnnotation, EntityAnnotation, ImageProperties,
        LocalizedObjectAnnotation, VisionColor,
    };

    fn entity(description: &str, score: f32) -> EntityAnnotation {
        EntityAnnotation {
            description: description.to_string(),
            score,
        }
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_alt_text_prefers_landmark() {
        assert_eq!(
            build_alt_text(&strings(&["Eiffel Tower"]), &strings(&["tower", "sky"])),
            "Eiffel Tower"
        );
    }

    #[test]
    fn test_alt_text_uses_top_three_labels() {
        assert_eq!(
            build_alt_text(&[], &strings(&["Dog", "Park", "Grass", "Tree"])),
            "Image containing Dog, Park, Grass"
        );
        assert_eq!(build_alt_text(&[], &strings(&["dog", "park"])), "Image containing dog, park");
    }

    #[test]
    fn test_alt_text_default() {
        assert_eq!(build_alt_text(&[], &[]), DEFAULT_ALT_TEXT);
        assert_eq!(build_alt_text(&strings(&[" "]), &strings(&[""])), DEFAULT_ALT_TEXT);
    }

    #[test]
    fn test_extract_labels_threshold_order_and_dedupe() {
        let response = AnnotateImageResponse {
            label_annotations: vec![entity("Dog", 0.97), entity("Blur", 0.3), entity("Park", 0.8)],
            localized_object_annotations: vec![
                LocalizedObjectAnnotation { name: "dog".into(), score: 0.9 },
                LocalizedObjectAnnotation { name: "Frisbee".into(), score: 0.7 },
                LocalizedObjectAnnotation { name: "Shoe".into(), score: 0.2 },
            ],
            landmark_annotations: vec![entity("Central Park", 0.1)],
            logo_annotations: vec![entity("Acme", 0.05)],
            ..Default::default()
        };

        assert_eq!(
            extract_labels(&response, 0.5),
            vec!["dog", "park", "frisbee", "central park", "acme"]
        );
    }

    #[test]
    fn test_from_response() {
        let response = AnnotateImageResponse {
            label_annotations: vec![
                entity("Dog", 0.97),
                entity("Park", 0.9),
                entity("Grass", 0.8),
                entity("Leash", 0.7),
            ],
            text_annotations: vec![entity("  NO DOGS  \n", 0.0)],
            image_properties_annotation: Some(ImageProperties {
                dominant_colors: DominantColorsAnnotation {
                    colors: vec![
                        ColorInfo {
                            color: VisionColor { red: 12.4, green: 300.0, blue: 0.0 },
                            score: 0.6,
                            pixel_fraction: 0.3,
                        };
                        4
                    ],
                },
            }),
            ..Default::default()
        };

        let analysis = ImageAnalysis::from_response(&response, 2, 0.5);
        assert_eq!(analysis.alt_text, "Image containing Dog, Park, Grass");
        assert_eq!(analysis.labels, vec!["dog", "park"]);
        assert_eq!(analysis.detected_text.as_deref(), Some("NO DOGS"));
        assert_eq!(analysis.dominant_colors.len(), 3);
        assert_eq!(
            analysis.dominant_colors[0],
            DominantColor { red: 12, green: 255, blue: 0, score: 0.6 }
        );
    }

    #[test]
    fn test_from_labels() {
        let analysis = ImageAnalysis::from_labels(&["Dog", "park"]);
        assert_eq!(analysis.alt_text, "Image containing Dog, park");
        assert_eq!(analysis.labels, vec!["dog", "park"]);
    }
}
