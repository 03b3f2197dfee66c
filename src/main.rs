//! Download audio for every track in the list and transcode it to MP3.
//!
//! Usage: fetch-tracks [--tracks top_tracks_with_urls.json] [--output-dir mp3_downloads]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use track_mirror::fetcher::{fetch_all, TranscodeTarget, YtDlp};
use track_mirror::logging;
use track_mirror::progress::{format_duration, print_summary, set_log_only};
use track_mirror::tracklist::load_tracks;

#[derive(Parser)]
#[command(name = "fetch-tracks")]
#[command(about = "Download and transcode audio for every track in a JSON track list")]
struct Args {
    /// JSON array of track records
    #[arg(long, default_value = "top_tracks_with_urls.json")]
    tracks: PathBuf,

    /// Folder the audio files are written to (created if missing)
    #[arg(long, default_value = "mp3_downloads")]
    output_dir: PathBuf,

    /// yt-dlp executable
    #[arg(long, default_value = "yt-dlp")]
    yt_dlp: PathBuf,

    /// Target MP3 bitrate in kbps
    #[arg(long, default_value = "192")]
    bitrate: u32,

    /// Hide progress bars and print periodic progress lines instead
    #[arg(long)]
    log_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_only(args.log_only);
    logging::init_logging();

    let start = Instant::now();

    println!("Loading track list: {:?}", args.tracks);
    let tracks = load_tracks(&args.tracks)?;
    println!("Found {} tracks", tracks.len());

    let downloader = YtDlp::new(
        args.yt_dlp,
        TranscodeTarget {
            bitrate_kbps: args.bitrate,
            ..TranscodeTarget::default()
        },
    );
    let summary = fetch_all(&tracks, &args.output_dir, &downloader)?;

    print_summary(
        "Download complete!",
        &[
            ("Downloaded", summary.downloaded.to_string()),
            ("Skipped (no source URL)", summary.skipped.to_string()),
            ("Failed", summary.failed.to_string()),
            ("Total tracks", summary.total.to_string()),
            ("Output folder", args.output_dir.display().to_string()),
            ("Elapsed", format_duration(start.elapsed())),
        ],
    );

    Ok(())
}
