// src/config.rs
// =============================================================================
// Run configuration for one mirror.
//
// The CLI builds a MirrorConfig from its flags (each flag can also come from
// an environment variable, see cli.rs). Defaults live here as constants so
// the CLI and the tests agree on them.
// =============================================================================

use crate::error::{MirrorError, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SITE_URL: &str = "https://www.composingprograms.com";
pub const DEFAULT_OUTPUT_DIR: &str = "site";
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Root URL of the site; its origin bounds the crawl
    pub site: Url,
    /// Directory the mirror is written into (cleared before each run)
    pub output: PathBuf,
    /// Maximum number of concurrent fetches
    pub workers: usize,
    /// Per-request timeout
    pub timeout: Duration,
}

impl MirrorConfig {
    // Validates the site URL and clamps the worker count to at least one
    pub fn new(site_url: &str, output: PathBuf, workers: usize, timeout_secs: u64) -> Result<Self> {
        let site = Url::parse(site_url)
            .map_err(|e| MirrorError::InvalidSiteUrl(format!("{}: {}", site_url, e)))?;

        if !matches!(site.scheme(), "http" | "https") || site.host_str().is_none() {
            return Err(MirrorError::InvalidSiteUrl(site_url.to_string()));
        }

        Ok(Self {
            site,
            output,
            workers: workers.max(1),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
