//! Title-to-filename derivation shared by fetch-tracks and link-tracks.
//!
//! CRITICAL: the downloader names files with `sanitize_title` and the
//! reconciler looks them up with the same function. Any change here breaks
//! matching for every file already on disk.

use once_cell::sync::Lazy;
use regex::Regex;

/// Stem used when a title sanitizes to nothing.
pub const FALLBACK_STEM: &str = "unknown_title";

/// Extension the reconciler expects downloaded audio to carry.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Characters rejected by Windows filesystems (and `/` everywhere).
static FORBIDDEN_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Turn a display title into a filesystem-safe file stem.
///
/// - Replaces each of `<>:"/\|?*` with `-`
/// - Strips trailing dots and spaces (Windows drops them silently)
/// - Falls back to [`FALLBACK_STEM`] when nothing is left
pub fn sanitize_title(title: &str) -> String {
    let replaced = FORBIDDEN_CHARS.replace_all(title, "-");
    let trimmed = replaced.trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Filename the reconciler expects for a title: `<stem>.mp3`.
pub fn expected_filename(title: &str) -> String {
    format!("{}.{}", sanitize_title(title), AUDIO_EXTENSION)
}
