//! Reading and rewriting the JSON track list.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::models::TrackRecord;

/// Load the track list. A missing or malformed file is fatal for every
/// binary, so errors carry the path.
pub fn load_tracks(path: &Path) -> Result<Vec<TrackRecord>> {
    if !path.exists() {
        bail!("Track list '{}' does not exist", path.display());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read track list '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Track list '{}' is not a JSON array of objects", path.display()))
}

/// Rewrite the track list: two-space indent, non-ASCII kept literal,
/// original key order preserved.
pub fn save_tracks(path: &Path, tracks: &[TrackRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(tracks).context("Failed to serialize track list")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write track list '{}'", path.display()))
}
