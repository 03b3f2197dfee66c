//! fetch -> link -> publish over a temp directory, with fake download and
//! storage backends.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use track_mirror::fetcher::{fetch_all, DownloadError, Downloader};
use track_mirror::publisher::{publish_all, CdnManifest};
use track_mirror::reconcile::{list_audio_files, reconcile};
use track_mirror::storage::{ObjectStore, PutObject, StoreError, StoreErrorKind};
use track_mirror::tracklist::{load_tracks, save_tracks};

/// Writes a tiny MP3 stand-in, like yt-dlp after transcoding.
struct WritesMp3;

impl Downloader for WritesMp3 {
    fn download(&self, _url: &str, output_dir: &Path, stem: &str) -> Result<(), DownloadError> {
        fs::write(output_dir.join(format!("{}.mp3", stem)), b"ID3\x03").unwrap();
        Ok(())
    }
}

/// Bucket without ACL support that remembers what was stored.
#[derive(Default)]
struct NoAclBucket {
    objects: RefCell<Vec<(String, Vec<u8>, Option<String>)>>,
}

impl ObjectStore for NoAclBucket {
    fn put_object(&self, request: &PutObject<'_>) -> Result<(), StoreError> {
        if request.acl.is_some() {
            return Err(StoreError::new(StoreErrorKind::AclUnsupported, "InvalidArgument: x-amz-acl"));
        }
        self.objects.borrow_mut().push((
            request.key.to_string(),
            request.body.as_ref().to_vec(),
            request.content_type.map(str::to_string),
        ));
        Ok(())
    }
}

#[test]
fn test_end_to_end_single_track() {
    let work = tempfile::tempdir().unwrap();
    let tracks_path = work.path().join("tracks.json");
    let media = work.path().join("mp3_downloads");
    fs::write(&tracks_path, r#"[{"Title":"Song: A/B","youtube_url":"http://x"}]"#).unwrap();

    // fetch
    let tracks = load_tracks(&tracks_path).unwrap();
    let fetched = fetch_all(&tracks, &media, &WritesMp3).unwrap();
    assert_eq!(fetched.downloaded, 1);
    assert!(media.join("Song- A-B.mp3").is_file());

    // link, with the folder given relative to the working directory
    let mut tracks = load_tracks(&tracks_path).unwrap();
    let files = list_audio_files(&media).unwrap();
    let linked = reconcile(&mut tracks, Path::new("mp3_downloads"), &files);
    assert_eq!(linked.matched, 1);
    save_tracks(&tracks_path, &tracks).unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&tracks_path).unwrap()).unwrap();
    assert_eq!(
        saved,
        serde_json::json!([{
            "Title": "Song: A/B",
            "youtube_url": "http://x",
            "local_path": "mp3_downloads/Song- A-B.mp3"
        }])
    );

    // publish
    let bucket = NoAclBucket::default();
    let report = publish_all(&media, &bucket, "https://pub-1234.r2.dev").unwrap();
    assert_eq!(report.uploaded, 1);
    assert_eq!(report.failed, 0);
    {
        let objects = bucket.objects.borrow();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].0, "Song- A-B.mp3");
        assert_eq!(objects[0].1, b"ID3\x03");
        assert_eq!(objects[0].2.as_deref(), Some("audio/mpeg"));
    }

    let manifest = CdnManifest::now(report.urls);
    let json_path = work.path().join("cdn_urls.json");
    let txt_path = work.path().join("cdn_urls.txt");
    manifest.write(&json_path, &txt_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["total_files"], 1);
    assert_eq!(
        json["urls"]["Song- A-B.mp3"],
        "https://pub-1234.r2.dev/Song-%20A-B.mp3"
    );

    let text = fs::read_to_string(&txt_path).unwrap();
    let url_lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .collect();
    assert_eq!(url_lines, vec!["https://pub-1234.r2.dev/Song-%20A-B.mp3"]);
    assert!(text.contains("# Total files: 1"));
}

#[test]
fn test_record_without_url_stays_unlinked() {
    let work = tempfile::tempdir().unwrap();
    let media = work.path().join("media");
    let tracks: Vec<track_mirror::models::TrackRecord> = serde_json::from_str(
        r#"[{"title": "Has Url", "source_url": "http://x"}, {"title": "No Url", "source_url": ""}]"#,
    )
    .unwrap();

    let fetched = fetch_all(&tracks, &media, &WritesMp3).unwrap();
    assert_eq!(fetched.skipped, 1);

    let mut tracks = tracks;
    let files = list_audio_files(&media).unwrap();
    let linked = reconcile(&mut tracks, &media, &files);
    assert_eq!(linked.matched, 1);
    assert_eq!(linked.skipped, 1);
    assert_eq!(tracks[1].local_path(), None);
    assert!(!media.join("No Url.mp3").exists());
}
