//! track-mirror library - shared modules for the fetch, link and publish binaries.

pub mod config;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod progress;
pub mod publisher;
pub mod reconcile;
pub mod s3;
pub mod sanitize;
pub mod storage;
pub mod tracklist;
