//! Upload downloaded media to an S3-compatible bucket and save the public URLs.
//!
//! Usage: publish-tracks [--output-dir mp3_downloads] (storage settings via R2_* env vars)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use track_mirror::config::{StorageArgs, StorageConfig};
use track_mirror::logging;
use track_mirror::progress::{format_duration, print_summary, set_log_only};
use track_mirror::publisher::{publish_all, CdnManifest};
use track_mirror::s3::S3Client;

#[derive(Parser)]
#[command(name = "publish-tracks")]
#[command(about = "Upload downloaded media files to object storage and record their public URLs")]
struct Args {
    /// Folder holding the media files
    #[arg(long, default_value = "mp3_downloads")]
    output_dir: PathBuf,

    #[arg(long, default_value = "cdn_urls.json")]
    json_out: PathBuf,

    #[arg(long, default_value = "cdn_urls.txt")]
    txt_out: PathBuf,

    #[command(flatten)]
    storage: StorageArgs,

    /// Hide progress bars and print periodic progress lines instead
    #[arg(long)]
    log_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_only(args.log_only);
    logging::init_logging();

    let config = StorageConfig::from_args(&args.storage).context("Invalid storage configuration")?;
    println!("Using public base URL: {}", config.public_base);
    println!("Uploading to bucket '{}' at {}", config.bucket, config.endpoint);

    let start = Instant::now();
    let store = S3Client::new(&config)?;
    let report = publish_all(&args.output_dir, &store, &config.public_base)?;

    let saved = report.urls.len();
    if saved > 0 {
        let manifest = CdnManifest::now(report.urls);
        manifest.write(&args.json_out, &args.txt_out)?;
        println!("\nCDN URLs saved to:");
        println!("  JSON: {}", args.json_out.display());
        println!("  TXT: {}", args.txt_out.display());
    }

    print_summary(
        "Upload complete!",
        &[
            ("Successfully uploaded", report.uploaded.to_string()),
            ("Failed", report.failed.to_string()),
            ("Total URLs saved", saved.to_string()),
            ("Elapsed", format_duration(start.elapsed())),
        ],
    );

    Ok(())
}
