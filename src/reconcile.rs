//! Link track records to the files fetch-tracks left on disk.
//!
//! A record is linked when `<sanitized title>.mp3` exists in the download
//! folder. Existing links are never rewritten, so running twice is a no-op.
//!
//! Two different titles that sanitize to the same name compete for one
//! file. The first record in list order (or one already linked to it) keeps
//! the file and later ones are reported as collisions and left unlinked.
//! Records repeating the exact same title all share the file.

use anyhow::{bail, Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::models::TrackRecord;
use crate::progress::{create_progress_bar, log_progress};
use crate::sanitize::{expected_filename, AUDIO_EXTENSION};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub matched: usize,
    /// Expected file missing, or claimed by another record
    pub skipped: usize,
    pub already_linked: usize,
    pub total: usize,
}

/// Names of `.mp3` files (extension case-insensitive) directly in `dir`.
pub fn list_audio_files(dir: &Path) -> Result<FxHashSet<String>> {
    if !dir.is_dir() {
        bail!("Folder '{}' does not exist", dir.display());
    }
    let mut names = FxHashSet::default();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list '{}'", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_audio = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(AUDIO_EXTENSION));
        if is_audio {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.insert(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Link stored in the record: `folder/filename` with `/` separators on
/// every platform.
pub fn relative_link(folder: &Path, filename: &str) -> String {
    folder.join(filename).to_string_lossy().replace('\\', "/")
}

/// Filename part of a stored link, whichever separator it was written with.
fn link_filename(link: &str) -> &str {
    link.rsplit(['/', '\\']).next().unwrap_or(link)
}

/// Add `local_path` to every unlinked record whose file is in `files`.
pub fn reconcile(
    tracks: &mut [TrackRecord],
    folder: &Path,
    files: &FxHashSet<String>,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary {
        total: tracks.len(),
        ..Default::default()
    };

    // filename -> title of the record holding it
    let mut claimed: FxHashMap<String, String> = FxHashMap::default();
    for track in tracks.iter() {
        if let Some(link) = track.local_path() {
            claimed
                .entry(link_filename(link).to_string())
                .or_insert_with(|| track.title().unwrap_or_default().to_string());
        }
    }

    let total = tracks.len() as u64;
    let pb = create_progress_bar(total, "Matching");

    for (i, track) in tracks.iter_mut().enumerate() {
        pb.inc(1);
        log_progress("match", i as u64 + 1, total, 50);

        if track.local_path().is_some() {
            summary.already_linked += 1;
            continue;
        }

        let title = track.display_title().to_string();
        let raw_title = track.title().unwrap_or_default().to_string();
        let filename = expected_filename(&raw_title);
        if !files.contains(&filename) {
            warn!("Skipped: {} (file not found: {})", title, filename);
            summary.skipped += 1;
            continue;
        }

        let holder = claimed
            .entry(filename.clone())
            .or_insert_with(|| raw_title.clone());
        if *holder != raw_title {
            warn!("Skipped: {} ({} is already linked to \"{}\")", title, filename, holder);
            summary.skipped += 1;
            continue;
        }

        let link = relative_link(folder, &filename);
        info!("Matched: {} -> {}", title, link);
        track.set_local_path(link);
        summary.matched += 1;
    }

    pb.finish_with_message(format!("Matched {} tracks", summary.matched));
    summary
}
