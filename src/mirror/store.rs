// src/mirror/store.rs
// =============================================================================
// Writes fetched resources into the mirror directory.
//
// The on-disk layout mirrors the remote URL paths so a plain static file
// server can serve the copy:
//
//   /                      -> <root>/index.html
//   /guide/        (html)  -> <root>/guide/index.html
//   /about         (html)  -> <root>/about/index.html
//   /pages/ch1.html (html) -> <root>/pages/ch1.html
//   /css/site.css          -> <root>/css/site.css
//
// Every file is written fully into a temporary sibling and then renamed into
// place, so a reader (or a cancelled run) never sees half a file.
// =============================================================================

use crate::error::{MirrorError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const INDEX_FILE: &str = "index.html";
// Name used when a non-document resource lives at a directory-style URL
const BARE_INDEX_FILE: &str = "index";

#[derive(Debug, Clone)]
pub struct ResourceStore {
    root: PathBuf,
}

impl ResourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Removes any previous mirror and recreates an empty directory.
    // Mirrors are never incremental.
    pub async fn reset(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => debug!(dir = %self.root.display(), "removed previous mirror"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(MirrorError::io(&self.root, e)),
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| MirrorError::io(&self.root, e))
    }

    // Where a resource fetched from `url_path` ends up on disk. The path is
    // expected percent-decoded (a CanonicalPath), so names on disk match what
    // a static file server looks up after decoding a request.
    pub fn location(&self, url_path: &str, is_document: bool) -> PathBuf {
        let mut location = self.root.clone();

        // Only plain segments are joined so nothing can escape the root
        for segment in url_path.split('/') {
            if !matches!(segment, "" | "." | "..") {
                location.push(segment);
            }
        }

        if is_document {
            if !(url_path.ends_with(".html") || url_path.ends_with(".htm")) {
                location.push(INDEX_FILE);
            }
        } else if url_path.ends_with('/') || location == self.root {
            location.push(BARE_INDEX_FILE);
        }

        location
    }

    // Persists `bytes` for `url_path` and returns the file that was written
    pub async fn write(&self, url_path: &str, is_document: bool, bytes: &[u8]) -> Result<PathBuf> {
        let location = self.location(url_path, is_document);

        if let Some(parent) = location.parent() {
            // create_dir_all is fine with directories that already exist,
            // including ones another worker is creating right now
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MirrorError::io(parent, e))?;
        }

        let partial = partial_path(&location);
        tokio::fs::write(&partial, bytes)
            .await
            .map_err(|e| MirrorError::io(&partial, e))?;

        if let Err(e) = tokio::fs::rename(&partial, &location).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(MirrorError::io(&location, e));
        }

        debug!(file = %location.display(), bytes = bytes.len(), "wrote");
        Ok(location)
    }
}

// "<dir>/.<name>.part" next to the final file
fn partial_path(location: &Path) -> PathBuf {
    let name = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    location.with_file_name(format!(".{}.part", name))
}
