//! Download-and-transcode stage.
//!
//! Each record with a source URL is handed to a [`Downloader`], which writes
//! `<output_dir>/<sanitized title>.<ext>`. Failures are logged and counted;
//! the loop never stops early.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::TrackRecord;
use crate::progress::{create_progress_bar, log_progress};
use crate::sanitize::sanitize_title;

/// Codec and bitrate every download is re-encoded to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscodeTarget {
    pub codec: String,
    pub bitrate_kbps: u32,
}

impl Default for TranscodeTarget {
    fn default() -> Self {
        Self {
            codec: "mp3".to_string(),
            bitrate_kbps: 192,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("download tool exited with {}: {stderr}", exit_label(.code))]
    Failed { code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {}", c),
        None => "signal".to_string(),
    }
}

/// Something that can fetch `url` into `output_dir` as `<stem>.<ext>`.
pub trait Downloader {
    fn download(&self, url: &str, output_dir: &Path, stem: &str) -> Result<(), DownloadError>;
}

/// `yt-dlp` (with ffmpeg) as the download and transcode backend.
pub struct YtDlp {
    program: PathBuf,
    target: TranscodeTarget,
}

/// Lines of yt-dlp stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 5;

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, target: TranscodeTarget) -> Self {
        Self {
            program: program.into(),
            target,
        }
    }

    /// Command-line arguments for one download.
    pub fn args(&self, url: &str, output_dir: &Path, stem: &str) -> Vec<String> {
        // yt-dlp fills in %(ext)s after post-processing, so the final file
        // carries the target codec's extension.
        let template = output_dir.join(format!("{}.%(ext)s", stem));
        vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.target.codec.clone(),
            "--audio-quality".to_string(),
            format!("{}K", self.target.bitrate_kbps),
            "--output".to_string(),
            template.to_string_lossy().into_owned(),
            url.to_string(),
        ]
    }
}

impl Downloader for YtDlp {
    fn download(&self, url: &str, output_dir: &Path, stem: &str) -> Result<(), DownloadError> {
        let program = self.program.to_string_lossy().into_owned();
        let output = Command::new(&self.program)
            .args(self.args(url, output_dir, stem))
            .output()
            .map_err(|source| DownloadError::Spawn {
                program: program.clone(),
                source,
            })?;

        debug!("{} output: {}", program, String::from_utf8_lossy(&output.stdout).trim());

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join(" | ");
        Err(DownloadError::Failed {
            code: output.status.code(),
            stderr: if tail.is_empty() {
                "unknown error".to_string()
            } else {
                tail
            },
        })
    }
}

/// Counts reported after a fetch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

/// Download every record that has a source URL into `output_dir`.
///
/// Only creating `output_dir` can fail the whole run; per-record problems
/// end up in the summary.
pub fn fetch_all<D: Downloader + ?Sized>(
    tracks: &[TrackRecord],
    output_dir: &Path,
    downloader: &D,
) -> Result<FetchSummary> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output folder '{}'", output_dir.display()))?;

    let mut summary = FetchSummary {
        total: tracks.len(),
        ..Default::default()
    };

    let total = tracks.len() as u64;
    let pb = create_progress_bar(total, "Downloading");

    for (i, track) in tracks.iter().enumerate() {
        let title = track.display_title();
        match track.source_url() {
            None => {
                warn!("Skipping {} - no source URL found", title);
                summary.skipped += 1;
            }
            Some(url) => {
                let stem = sanitize_title(track.title().unwrap_or_default());
                info!("Downloading: {} ({})", title, url);
                match downloader.download(url, output_dir, &stem) {
                    Ok(()) => summary.downloaded += 1,
                    Err(e) => {
                        error!("Error downloading {}: {}", title, e);
                        summary.failed += 1;
                    }
                }
            }
        }
        pb.inc(1);
        log_progress("download", i as u64 + 1, total, 10);
    }

    pb.finish_with_message(format!("Downloaded {} tracks", summary.downloaded));
    Ok(summary)
}
