// src/mirror/dispatch.rs
// =============================================================================
// Routes a fetched resource to the handler for its content type.
//
//   text/html          -> HTML handler   (persist as document, follow links)
//   text/css           -> CSS handler    (persist verbatim, follow @import)
//   text/x-python etc. -> passthrough    (persist verbatim)
//   application/zip    -> passthrough    (persist verbatim)
//   anything else      -> unhandled      (logged, nothing written)
//
// Handlers do not schedule anything themselves: they return the targets they
// discovered and the driver decides what still needs fetching.
// =============================================================================

use super::path::{classify, resolve, CanonicalPath, Reference};
use super::store::ResourceStore;
use crate::error::{MirrorError, Result};
use crate::extract::{extract_css_imports, extract_html_refs};
use tracing::{debug, warn};
use url::Url;

// The closed set of content types the mirror understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    PlainText,
    Archive,
    /// Carries the declared type (or "none") for reporting
    Unhandled(String),
}

impl ContentKind {
    // Exact match on the media type; parameters like "; charset=utf-8" are ignored
    pub fn from_header(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return ContentKind::Unhandled("none".to_string());
        };
        let media_type = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

        match media_type.as_str() {
            "text/html" => ContentKind::Html,
            "text/css" => ContentKind::Css,
            "text/x-python" | "text/plain" | "text/javascript" | "application/javascript" => {
                ContentKind::PlainText
            }
            "application/zip" => ContentKind::Archive,
            _ => ContentKind::Unhandled(raw.to_string()),
        }
    }
}

// One response, alive only for the duration of a dispatch call
#[derive(Debug)]
pub struct FetchedResource {
    pub final_url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

// What happened to a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Persisted {
        kind: ContentKind,
        /// Same-origin targets found in the resource, already canonical
        targets: Vec<CanonicalPath>,
        /// Off-site references that were seen and skipped
        external: usize,
        /// References that could not be parsed
        malformed: usize,
    },
    Unhandled(String),
}

pub struct Dispatcher {
    site: Url,
    store: ResourceStore,
}

impl Dispatcher {
    pub fn new(site: Url, store: ResourceStore) -> Self {
        Self { site, store }
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub async fn dispatch(&self, resource: FetchedResource) -> Result<Dispatch> {
        let kind = ContentKind::from_header(resource.content_type.as_deref());

        match kind {
            ContentKind::Html => self.handle_html(&resource).await,
            ContentKind::Css => self.handle_css(&resource).await,
            ContentKind::PlainText | ContentKind::Archive => {
                self.handle_passthrough(&resource, kind).await
            }
            ContentKind::Unhandled(content_type) => {
                let unhandled = MirrorError::UnhandledContentType {
                    url: resource.final_url.to_string(),
                    content_type: content_type.clone(),
                };
                warn!("{}", unhandled);
                Ok(Dispatch::Unhandled(content_type))
            }
        }
    }

    // Resources are stored (and their links resolved) at the decoded path
    // they were actually served from, which differs from the requested one
    // after a redirect
    async fn handle_html(&self, resource: &FetchedResource) -> Result<Dispatch> {
        let served_at = CanonicalPath::from_url_path(resource.final_url.path());
        self.store.write(served_at.as_str(), true, &resource.body).await?;

        let html = String::from_utf8_lossy(&resource.body);
        let hrefs = extract_html_refs(&html);
        Ok(self.collect_targets(ContentKind::Html, &served_at, hrefs))
    }

    async fn handle_css(&self, resource: &FetchedResource) -> Result<Dispatch> {
        let served_at = CanonicalPath::from_url_path(resource.final_url.path());
        self.store.write(served_at.as_str(), false, &resource.body).await?;

        let css = String::from_utf8_lossy(&resource.body);
        let imports = extract_css_imports(&css);
        Ok(self.collect_targets(ContentKind::Css, &served_at, imports))
    }

    async fn handle_passthrough(&self, resource: &FetchedResource, kind: ContentKind) -> Result<Dispatch> {
        let served_at = CanonicalPath::from_url_path(resource.final_url.path());
        self.store.write(served_at.as_str(), false, &resource.body).await?;

        Ok(Dispatch::Persisted {
            kind,
            targets: Vec::new(),
            external: 0,
            malformed: 0,
        })
    }

    // Classifies and resolves raw hrefs found in the document at `referrer`
    fn collect_targets(&self, kind: ContentKind, referrer: &CanonicalPath, hrefs: Vec<String>) -> Dispatch {
        let mut targets = Vec::new();
        let mut external = 0;
        let mut malformed = 0;

        for href in hrefs {
            match classify(&href, &self.site) {
                Reference::Fragment => {}
                Reference::External(link) => {
                    debug!(%link, from = %referrer, "external link");
                    external += 1;
                }
                Reference::Malformed(link) => {
                    warn!(from = %referrer, "{}", MirrorError::MalformedReference(link));
                    malformed += 1;
                }
                Reference::Local(reference) => {
                    let target = resolve(&reference, referrer);
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
            }
        }

        Dispatch::Persisted {
            kind,
            targets,
            external,
            malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dispatcher(dir: &TempDir) -> Dispatcher {
        Dispatcher::new(
            Url::parse("https://example.com/").unwrap(),
            ResourceStore::new(dir.path()),
        )
    }

    fn resource(url: &str, content_type: &str, body: &str) -> FetchedResource {
        FetchedResource {
            final_url: Url::parse(url).unwrap(),
            content_type: Some(content_type.to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    fn targets(dispatch: &Dispatch) -> Vec<&str> {
        match dispatch {
            Dispatch::Persisted { targets, .. } => targets.iter().map(|t| t.as_str()).collect(),
            Dispatch::Unhandled(_) => Vec::new(),
        }
    }

    #[test]
    fn test_content_kind_table() {
        assert_eq!(ContentKind::from_header(Some("text/html")), ContentKind::Html);
        assert_eq!(ContentKind::from_header(Some("text/html; charset=utf-8")), ContentKind::Html);
        assert_eq!(ContentKind::from_header(Some("text/css")), ContentKind::Css);
        assert_eq!(ContentKind::from_header(Some("text/x-python")), ContentKind::PlainText);
        assert_eq!(ContentKind::from_header(Some("application/zip")), ContentKind::Archive);
        assert_eq!(
            ContentKind::from_header(Some("application/pdf")),
            ContentKind::Unhandled("application/pdf".into())
        );
        assert_eq!(ContentKind::from_header(None), ContentKind::Unhandled("none".into()));
    }

    #[tokio::test]
    async fn test_html_is_stored_as_index_and_links_resolved() {
        let dir = TempDir::new().unwrap();
        let page = r##"
            <link rel="stylesheet" href="../css/site.css">
            <a href="#top">top</a>
            <a href="intro.html">intro</a>
            <a href="next">next</a>
            <a href="/guide/intro.html#part2">intro again</a>
            <a href="http://other-domain.org/x">elsewhere</a>
            <a href="https://example.com/about">about</a>
        "##;

        let result = dispatcher(&dir)
            .dispatch(resource("https://example.com/guide/", "text/html", page))
            .await
            .unwrap();

        assert_eq!(
            targets(&result),
            vec!["/css/site.css", "/guide/intro.html", "/guide/next/", "/about/"]
        );
        match result {
            Dispatch::Persisted { kind, external, .. } => {
                assert_eq!(kind, ContentKind::Html);
                assert_eq!(external, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(dir.path().join("guide/index.html").is_file());
    }

    #[tokio::test]
    async fn test_css_is_stored_verbatim_and_imports_resolved() {
        let dir = TempDir::new().unwrap();
        let css = r#"@import "base.css"; @import url(/fonts/f.css); h1 { background: url(h.png); }"#;

        let result = dispatcher(&dir)
            .dispatch(resource("https://example.com/css/site.css", "text/css", css))
            .await
            .unwrap();

        assert_eq!(targets(&result), vec!["/css/base.css", "/fonts/f.css"]);
        assert_eq!(std::fs::read_to_string(dir.path().join("css/site.css")).unwrap(), css);
    }

    #[tokio::test]
    async fn test_passthrough_writes_bytes_without_targets() {
        let dir = TempDir::new().unwrap();
        let result = dispatcher(&dir)
            .dispatch(resource("https://example.com/code/hog.py", "text/x-python", "print('hi')"))
            .await
            .unwrap();

        assert!(targets(&result).is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("code/hog.py")).unwrap(),
            "print('hi')"
        );
    }

    #[tokio::test]
    async fn test_encoded_url_is_stored_under_decoded_name() {
        let dir = TempDir::new().unwrap();
        let result = dispatcher(&dir)
            .dispatch(resource(
                "https://example.com/my%20notes/page%201.html",
                "text/html",
                r#"<a href="next%20page.html">next</a>"#,
            ))
            .await
            .unwrap();

        assert_eq!(targets(&result), vec!["/my notes/next page.html"]);
        assert!(dir.path().join("my notes/page 1.html").is_file());
    }

    #[tokio::test]
    async fn test_unhandled_type_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = dispatcher(&dir)
            .dispatch(resource("https://example.com/paper.pdf", "application/pdf", "%PDF"))
            .await
            .unwrap();

        assert_eq!(result, Dispatch::Unhandled("application/pdf".into()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
