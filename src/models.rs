//! Core data models shared by the fetch, link and publish binaries.
//!
//! A track list is a JSON array of loosely-typed objects. Older lists use
//! `Title` / `youtube_url` / `mp3_path`; newer ones use `title` /
//! `source_url` / `local_path`. Both are read, links are always written
//! under the canonical key, and every other field is carried through
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sanitize::FALLBACK_STEM;

// ============================================================================
// Field Names
// ============================================================================

pub const TITLE_KEYS: &[&str] = &["title", "Title"];
pub const SOURCE_URL_KEYS: &[&str] = &["source_url", "youtube_url"];
pub const LOCAL_PATH_KEYS: &[&str] = &["local_path", "mp3_path"];

/// Key written by the reconciler.
pub const LOCAL_PATH_KEY: &str = "local_path";

// ============================================================================
// Track Record
// ============================================================================

/// One entry of the track list.
///
/// Identity is positional: there is no ID field, and two records may carry
/// the same title.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRecord {
    fields: Map<String, Value>,
}

impl TrackRecord {
    /// Build a record with canonical keys (used by tests and tooling).
    pub fn new(title: &str, source_url: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.to_string()));
        fields.insert(
            "source_url".to_string(),
            source_url.map_or(Value::Null, |u| Value::String(u.to_string())),
        );
        Self { fields }
    }

    /// First of `keys` present in the record, if it holds a string.
    /// A canonical key that is present but null hides its legacy alias.
    fn string_field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|key| self.fields.get(*key))
            .and_then(Value::as_str)
    }

    /// Raw title, if the record has one.
    pub fn title(&self) -> Option<&str> {
        self.string_field(TITLE_KEYS)
    }

    /// Title for log lines; never empty.
    pub fn display_title(&self) -> &str {
        match self.title() {
            Some(t) if !t.trim().is_empty() => t,
            _ => FALLBACK_STEM,
        }
    }

    /// Source URL, or `None` when absent, null or blank.
    pub fn source_url(&self) -> Option<&str> {
        self.string_field(SOURCE_URL_KEYS)
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Existing local path, or `None` when absent, null or empty.
    pub fn local_path(&self) -> Option<&str> {
        self.string_field(LOCAL_PATH_KEYS).filter(|p| !p.is_empty())
    }

    pub fn set_local_path(&mut self, path: String) {
        self.fields
            .insert(LOCAL_PATH_KEY.to_string(), Value::String(path));
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for TrackRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> TrackRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_legacy_keys() {
        let r = record(json!({"Title": "Song", "youtube_url": "http://x", "mp3_path": "a/b.mp3"}));
        assert_eq!(r.title(), Some("Song"));
        assert_eq!(r.source_url(), Some("http://x"));
        assert_eq!(r.local_path(), Some("a/b.mp3"));
    }

    #[test]
    fn test_canonical_keys_win() {
        let r = record(json!({"title": "New", "Title": "Old", "source_url": null, "youtube_url": "http://x"}));
        assert_eq!(r.title(), Some("New"));
        // Present-but-null canonical URL is not replaced by the legacy one
        assert_eq!(r.source_url(), None);
    }

    #[test]
    fn test_blank_url_is_missing() {
        assert_eq!(record(json!({"title": "a", "source_url": "   "})).source_url(), None);
        assert_eq!(record(json!({"title": "a"})).source_url(), None);
        assert_eq!(record(json!({"title": "a", "source_url": 42})).source_url(), None);
    }

    #[test]
    fn test_display_title_fallback() {
        assert_eq!(record(json!({})).display_title(), "unknown_title");
        assert_eq!(record(json!({"title": null})).display_title(), "unknown_title");
        assert_eq!(record(json!({"title": "Hey"})).display_title(), "Hey");
    }

    #[test]
    fn test_empty_local_path_is_unlinked() {
        let r = record(json!({"title": "a", "local_path": ""}));
        assert_eq!(r.local_path(), None);
    }

    #[test]
    fn test_set_local_path_preserves_other_fields() {
        let mut r = record(json!({"Title": "Song", "rank": 3, "youtube_url": "http://x"}));
        r.set_local_path("mp3_downloads/Song.mp3".to_string());
        let out = serde_json::to_value(&r).unwrap();
        assert_eq!(
            out,
            json!({
                "Title": "Song",
                "rank": 3,
                "youtube_url": "http://x",
                "local_path": "mp3_downloads/Song.mp3"
            })
        );
    }
}
