// src/models/tag.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Longest tag name kept after normalization
pub const MAX_TAG_LEN: usize = 64;

/// Tag row, unique by normalized name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Tag with the number of photos carrying it (GET /tags)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TagCount {
    pub name: String,
    pub photo_count: i64,
}

/// Canonical form of a tag name: trimmed, lowercase, single spaces
/// Returns None when nothing is left
pub fn normalize_tag_name(raw: &str) -> Option<String> {
    let name = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if name.is_empty() {
        return None;
    }

    let truncated: String = name.chars().take(MAX_TAG_LEN).collect();
    Some(truncated.trim_end().to_string())
}

/// Parse a comma-separated tag field into normalized, unique names
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    merge_tags(raw.split(',').map(str::to_string), std::iter::empty())
}

/// Normalize and concatenate two tag sources, dropping duplicates
/// First occurrence wins, so user tags keep their position ahead of detected ones
pub fn merge_tags<A, B>(first: A, second: B) -> Vec<String>
where
    A: IntoIterator<Item = String>,
    B: IntoIterator<Item = String>,
{
    let mut merged: Vec<String> = Vec::new();
    for name in first.into_iter().chain(second) {
        if let Some(name) = normalize_tag_name(&name) {
            if !merged.contains(&name) {
                merged.push(name);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag_name() {
        assert_eq!(normalize_tag_name("  Golden   Retriever "), Some("golden retriever".into()));
        assert_eq!(normalize_tag_name("DOG"), Some("dog".into()));
        assert_eq!(normalize_tag_name("   "), None);

        let long = "x".repeat(200);
        assert_eq!(normalize_tag_name(&long).unwrap().len(), MAX_TAG_LEN);
    }

    #[test]
    fn test_parse_tag_list_dedupes() {
        assert_eq!(
            parse_tag_list("Dog, park,dog , ,PARK,sunset"),
            vec!["dog", "park", "sunset"]
        );
        assert!(parse_tag_list("").is_empty());
    }

    #[test]
    fn test_merge_tags_keeps_user_order() {
        let merged = merge_tags(
            vec!["Beach".to_string(), "holiday".to_string()],
            vec!["sky".to_string(), "beach".to_string()],
        );
        assert_eq!(merged, vec!["beach", "holiday", "sky"]);
    }
}
