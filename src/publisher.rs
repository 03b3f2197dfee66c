//! Upload stage: push every media file in the download folder to object
//! storage and record where it can be fetched publicly.

use anyhow::{bail, Context, Result};
use chrono::{Local, SecondsFormat};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::progress::{create_progress_bar, log_progress};
use crate::storage::{CannedAcl, ObjectBody, ObjectStore, PutObject, StoreError, StoreErrorKind};

/// Extensions picked up from the download folder, with their content type.
pub const MEDIA_TYPES: &[(&str, &str)] = &[("mp3", "audio/mpeg"), ("mp4", "video/mp4")];

/// Content type for a media extension (case-insensitive), or `None` if the
/// file is not something we publish.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
}

/// Regular files directly inside `dir` with a publishable extension,
/// sorted by filename.
pub fn collect_media_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Media folder '{}' not found", dir.display());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list '{}'", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && content_type_for(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Public URL of `key` under `public_base` (which has no trailing slash).
/// Only the URL is percent-encoded; the upload uses the raw key.
pub fn public_url(public_base: &str, key: &str) -> String {
    format!("{}/{}", public_base, urlencoding::encode(key))
}

/// Upload with a `public-read` ACL, retrying once without it when the
/// backend does not support ACLs.
pub fn upload_with_acl_fallback<S: ObjectStore + ?Sized>(
    store: &S,
    key: &str,
    body: ObjectBody,
    content_type: Option<&str>,
) -> Result<(), StoreError> {
    let request = PutObject {
        key,
        body,
        content_type,
        acl: Some(CannedAcl::PublicRead),
    };
    match store.put_object(&request) {
        Err(e) if e.is_acl_unsupported() => {
            warn!(
                "ACL not supported for {} ({}), uploading without ACL (bucket-level public access required)",
                key, e.message
            );
            store.put_object(&request.without_acl())
        }
        other => other,
    }
}

// ============================================================================
// Manifest
// ============================================================================

/// Filename → public URL mapping plus when it was produced. Both output
/// files are rendered from one value so they cannot disagree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CdnManifest {
    pub generated_at: String,
    pub total_files: usize,
    pub urls: BTreeMap<String, String>,
}

impl CdnManifest {
    pub fn new(urls: BTreeMap<String, String>, generated_at: String) -> Self {
        Self {
            generated_at,
            total_files: urls.len(),
            urls,
        }
    }

    /// Manifest stamped with the current local time.
    pub fn now(urls: BTreeMap<String, String>) -> Self {
        Self::new(
            urls,
            Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        )
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize CDN manifest")
    }

    /// `#` header lines, a blank line, then one URL per line.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "# CDN URLs generated at {}\n# Total files: {}\n\n",
            self.generated_at, self.total_files
        );
        for url in self.urls.values() {
            out.push_str(url);
            out.push('\n');
        }
        out
    }

    pub fn write(&self, json_path: &Path, text_path: &Path) -> Result<()> {
        fs::write(json_path, self.to_json()?)
            .with_context(|| format!("Failed to write '{}'", json_path.display()))?;
        fs::write(text_path, self.to_text())
            .with_context(|| format!("Failed to write '{}'", text_path.display()))?;
        Ok(())
    }
}

// ============================================================================
// Run
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublishReport {
    pub urls: BTreeMap<String, String>,
    pub uploaded: usize,
    pub failed: usize,
}

/// Upload every media file in `dir`. Only a missing folder is fatal; each
/// file's failure is logged and counted.
pub fn publish_all<S: ObjectStore + ?Sized>(
    dir: &Path,
    store: &S,
    public_base: &str,
) -> Result<PublishReport> {
    let files = collect_media_files(dir)?;
    info!("Found {} media files in '{}'", files.len(), dir.display());

    let mut report = PublishReport::default();
    let total = files.len() as u64;
    let pb = create_progress_bar(total, "Uploading");

    for (i, path) in files.iter().enumerate() {
        pb.inc(1);
        log_progress("upload", i as u64 + 1, total, 10);

        // The object key must be the exact filename
        let Some(key) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            warn!("Skipping {} - filename is not valid UTF-8", path.display());
            report.failed += 1;
            continue;
        };
        info!("Uploading: {}", key);

        let result = fs::read(path)
            .map_err(|e| StoreError::new(StoreErrorKind::Io, e.to_string()))
            .and_then(|body| upload_with_acl_fallback(store, &key, body.into(), content_type_for(path)));

        match result {
            Ok(()) => {
                let url = public_url(public_base, &key);
                info!("CDN URL: {}", url);
                report.urls.insert(key, url);
                report.uploaded += 1;
            }
            Err(e) => {
                error!("Failed to upload {}: {}", key, e);
                report.failed += 1;
            }
        }
    }

    pb.finish_with_message(format!("Uploaded {} files", report.uploaded));
    Ok(report)
}
