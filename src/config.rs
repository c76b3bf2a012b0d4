use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// How often `notifications watch` polls the backend.
pub const DEFAULT_POLL_SECS: u64 = 30;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, e.g. `https://api.example.com`.
    pub api_url: String,
    /// S3 bucket whose URLs get proxied. Unset means any bucket.
    pub aws_bucket: Option<String>,
    /// Override for the notification cache directory.
    pub cache_dir: Option<PathBuf>,
    pub poll_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("ESTATE_API_URL")
            .context("ESTATE_API_URL is not set")?
            .trim_end_matches('/')
            .to_string();
        let aws_bucket = env::var("ESTATE_AWS_BUCKET")
            .ok()
            .filter(|v| !v.is_empty());
        let cache_dir = env::var("ESTATE_CACHE_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        // A zero period would panic the watch ticker.
        let poll_secs = env::var("ESTATE_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_POLL_SECS);

        Ok(Self {
            api_url,
            aws_bucket,
            cache_dir,
            poll_secs,
        })
    }
}
