//! Storage configuration for publish-tracks.
//!
//! Values come from flags or the `R2_*` environment variables and are
//! validated once at startup into a [`StorageConfig`], which is then passed
//! by reference. Nothing here is global.

use clap::Args;
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Args, Clone, Debug, Default)]
pub struct StorageArgs {
    /// S3-compatible endpoint, e.g. https://<account>.r2.cloudflarestorage.com
    #[arg(long, env = "R2_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "R2_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    #[arg(long, env = "R2_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    #[arg(long, env = "R2_BUCKET")]
    pub bucket: Option<String>,

    /// Public root of the bucket, e.g. https://pub-xxxx.r2.dev
    #[arg(long, env = "R2_PUBLIC_BASE")]
    pub public_base: Option<String>,

    #[arg(long, env = "R2_REGION", default_value = "auto")]
    pub region: String,

    /// Per-request timeout for uploads
    #[arg(long, default_value = "300")]
    pub timeout_secs: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{env} is not set (pass --{flag} or set {env})")]
    Missing {
        flag: &'static str,
        env: &'static str,
    },
    #[error("{env} is not a valid http(s) URL: '{value}'")]
    InvalidUrl { env: &'static str, value: String },
}

/// Validated storage settings.
#[derive(Clone)]
pub struct StorageConfig {
    /// Endpoint without trailing slash
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Public base URL without trailing slash
    pub public_base: String,
    pub region: String,
    pub timeout: Duration,
}

fn required(
    value: &Option<String>,
    flag: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing { flag, env })
}

fn http_url(value: String, env: &'static str) -> Result<String, ConfigError> {
    let trimmed = value.trim_end_matches('/').to_string();
    match Url::parse(&trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(trimmed),
        _ => Err(ConfigError::InvalidUrl { env, value }),
    }
}

impl StorageConfig {
    /// Validate flags/env. The public base is checked first since every
    /// URL we hand out depends on it.
    pub fn from_args(args: &StorageArgs) -> Result<Self, ConfigError> {
        let public_base = http_url(
            required(&args.public_base, "public-base", "R2_PUBLIC_BASE")?,
            "R2_PUBLIC_BASE",
        )?;
        let endpoint = http_url(
            required(&args.endpoint, "endpoint", "R2_ENDPOINT")?,
            "R2_ENDPOINT",
        )?;

        Ok(Self {
            endpoint,
            access_key: required(&args.access_key, "access-key", "R2_ACCESS_KEY")?,
            secret_key: required(&args.secret_key, "secret-key", "R2_SECRET_KEY")?,
            bucket: required(&args.bucket, "bucket", "R2_BUCKET")?,
            public_base,
            region: args.region.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
        })
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("public_base", &self.public_base)
            .field("region", &self.region)
            .field("timeout", &self.timeout)
            .finish()
    }
}
