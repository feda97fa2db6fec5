// src/error.rs
// =============================================================================
// Error types for the mirror engine.
//
// Most of these are "local" failures: the driver logs them and keeps crawling
// the rest of the site. Only `Io` (and `InvalidSiteUrl`, which happens before
// the crawl starts) ends a run.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    /// The request never produced a response (timeout, DNS, TLS, redirect loop)
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The server answered with a non-success status
    #[error("failed {url} with status {status}")]
    Status { url: String, status: u16 },

    #[error("unhandled content-type {content_type} for {url}")]
    UnhandledContentType { url: String, content_type: String },

    #[error("malformed reference: {0}")]
    MalformedReference(String),

    /// Writing the mirror failed; partial mirrors are not useful so this is fatal
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid site URL: {0}")]
    InvalidSiteUrl(String),
}

impl MirrorError {
    // Helper so call sites can write `.map_err(|e| MirrorError::io(&path, e))`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MirrorError::Io {
            path: path.into(),
            source,
        }
    }

    // Whether this error should stop the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, MirrorError::Io { .. } | MirrorError::InvalidSiteUrl(_))
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
