//! Add `local_path` to every track whose MP3 is already in the download folder.
//!
//! Usage: link-tracks [--tracks top_tracks_with_urls.json] [--output-dir mp3_downloads]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use track_mirror::logging;
use track_mirror::progress::{format_duration, print_summary, set_log_only};
use track_mirror::reconcile::{list_audio_files, reconcile};
use track_mirror::tracklist::{load_tracks, save_tracks};

#[derive(Parser)]
#[command(name = "link-tracks")]
#[command(about = "Link track records to downloaded MP3 files and rewrite the track list")]
struct Args {
    /// JSON array of track records (rewritten in place)
    #[arg(long, default_value = "top_tracks_with_urls.json")]
    tracks: PathBuf,

    /// Folder fetch-tracks wrote into
    #[arg(long, default_value = "mp3_downloads")]
    output_dir: PathBuf,

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
    let mut tracks = load_tracks(&args.tracks)?;
    println!("Found {} tracks", tracks.len());

    let files = list_audio_files(&args.output_dir)?;
    println!("Found {} MP3 files in {:?}", files.len(), args.output_dir);

    let summary = reconcile(&mut tracks, &args.output_dir, &files);

    println!("Saving updated track list: {:?}", args.tracks);
    save_tracks(&args.tracks, &tracks)?;

    print_summary(
        "Linking complete!",
        &[
            ("Matched and added paths", summary.matched.to_string()),
            ("Skipped (file not found or claimed)", summary.skipped.to_string()),
            ("Already had paths", summary.already_linked.to_string()),
            ("Total tracks processed", summary.total.to_string()),
            ("Elapsed", format_duration(start.elapsed())),
        ],
    );

    Ok(())
}
