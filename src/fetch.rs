// src/fetch.rs
// =============================================================================
// This module downloads resources over HTTP.
//
// Key functionality:
// - GET requests with a per-request timeout (no request may hang a worker)
// - Redirects are followed by the client; the final URL is reported back so
//   the mirror stores the resource where it actually lives
// - Transport failures are categorized into readable reasons
//
// The mirror engine talks to the network through the `Fetcher` trait, which
// keeps the crawl logic testable without a real website.
// =============================================================================

use crate::error::{MirrorError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

// Everything the mirror needs from one HTTP response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Raw Content-Type header, if the server sent one
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// URL after redirects
    pub final_url: Url,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse>;
}

// The real fetcher, backed by a shared reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MirrorError::Fetch {
                url: String::new(),
                reason: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Whole body in memory: files are written in one piece later
        let body = response
            .bytes()
            .await
            .map_err(|e| categorize_error(url, e))?
            .to_vec();

        Ok(FetchResponse {
            status,
            content_type,
            body,
            final_url,
        })
    }
}

// Turns a reqwest error into a FetchFailure with a short reason
fn categorize_error(url: &Url, error: reqwest::Error) -> MirrorError {
    let error_string = error.to_string();

    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "could not resolve hostname".to_string()
        } else {
            "connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    MirrorError::Fetch {
        url: url.to_string(),
        reason,
    }
}
