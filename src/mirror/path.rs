// src/mirror/path.rs
// =============================================================================
// Turning raw hrefs into crawl targets.
//
// Two steps happen here:
// 1. classify(): is this href in-page, external, ours, or garbage?
// 2. resolve(): for hrefs that are ours, compute the CanonicalPath, the
//    site-relative key used both for deduplication and for fetching.
//
// Canonical form:
// - always starts with '/'
// - no scheme/host, no '#fragment', no '?query'
// - percent-decoded: "my%20page.html" and "my page.html" are the same key
// - '.' and '..' resolved, repeated slashes collapsed
// - ends with '/' only for directory-style targets (no file extension)
//
// The "no extension means directory" rule is a heuristic: `file.v2` counts as
// having an extension. We keep it as-is.
// =============================================================================

use std::fmt;
use url::Url;

// A normalized, site-relative path. Two references that point at the same
// resource always produce equal CanonicalPaths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub fn root() -> Self {
        CanonicalPath("/".to_string())
    }

    // Wraps a path taken from a parsed URL. The url crate has already
    // resolved dot segments, so only percent-decoding happens here (no slash
    // is added).
    pub fn from_url_path(path: &str) -> Self {
        if path.is_empty() {
            CanonicalPath::root()
        } else {
            CanonicalPath(decode_path(path))
        }
    }

    // The URL this path is fetched from: the site's origin, each segment
    // percent-encoded again, no query or fragment
    pub fn to_url(&self, site: &Url) -> Url {
        let encoded = self
            .0
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        let mut url = site.clone();
        url.set_path(&encoded);
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    // Directory-style targets end with a slash
    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    // The "/guide" -> "/guide/" variant tried after a 404
    pub fn with_trailing_slash(&self) -> Self {
        if self.is_directory() {
            self.clone()
        } else {
            CanonicalPath(format!("{}/", self.0))
        }
    }

    // Everything up to and including the last '/'
    //   "/a/b.html" -> "/a/"
    //   "/a/sub/"   -> "/a/sub/"
    fn directory(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..=idx],
            None => "/",
        }
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// What an href turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// "#section" - in-page, never a crawl target
    Fragment,
    /// Points somewhere other than the mirrored site
    External(String),
    /// Relative or root-relative href on our site, ready for resolve()
    Local(String),
    /// Looked like an absolute URL but did not parse
    Malformed(String),
}

// Decides what kind of reference `href` is, relative to the mirrored site.
//
// Absolute URLs on the site's own origin are reduced to their path (plus
// fragment, which resolve() strips) so they dedupe with relative links.
pub fn classify(href: &str, site: &Url) -> Reference {
    let href = href.trim();

    if href.starts_with('#') {
        return Reference::Fragment;
    }

    // Protocol-relative: "//host/path" inherits the site's scheme
    let absolute = if href.starts_with("//") {
        format!("{}:{}", site.scheme(), href)
    } else {
        href.to_string()
    };

    match Url::parse(&absolute) {
        Ok(url) => {
            if url.origin() == site.origin() {
                let mut local = url.path().to_string();
                if let Some(fragment) = url.fragment() {
                    local.push('#');
                    local.push_str(fragment);
                }
                Reference::Local(local)
            } else {
                Reference::External(href.to_string())
            }
        }
        // No scheme: a plain relative reference
        Err(url::ParseError::RelativeUrlWithoutBase) => Reference::Local(href.to_string()),
        Err(_) => Reference::Malformed(href.to_string()),
    }
}

// Resolves `reference` against the path of the document that contained it.
//
// Examples (referrer "/a/b.html"):
//   "sub"        -> "/a/sub/"
//   "sub.css"    -> "/a/sub.css"
//   "../x.html"  -> "/x.html"
//   "/c#top"     -> "/c/"
//   "my%20p.css" -> "/a/my p.css"
//   "?page=2"    -> "/a/b.html"
//   "."          -> "/"
pub fn resolve(reference: &str, referrer: &CanonicalPath) -> CanonicalPath {
    let reference = reference.trim();

    // A bare query points back at the referring document
    if reference.starts_with('?') {
        return referrer.clone();
    }

    // Fragments and queries never produce distinct targets
    let reference = decode_path(reference.split(['#', '?']).next().unwrap_or_default().trim());
    let reference = reference.as_str();

    if reference.is_empty() || reference == "." {
        return CanonicalPath::root();
    }

    let joined = if reference.starts_with('/') {
        reference.to_string()
    } else {
        format!("{}{}", referrer.directory(), reference)
    };

    let last_segment = joined.rsplit('/').next().unwrap_or_default();
    let directory_style = reference.ends_with('/') || !has_extension(last_segment);

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return CanonicalPath::root();
    }

    let mut path = format!("/{}", segments.join("/"));
    if directory_style {
        path.push('/');
    }
    CanonicalPath(path)
}

// Percent-decodes every segment of `path`. A segment that does not decode to
// UTF-8 is kept as written.
fn decode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

// Whether a final path segment carries a file extension.
// A leading dot (".hidden") or trailing dot ("name.") does not count,
// and neither do "." and "..".
pub fn has_extension(segment: &str) -> bool {
    match segment.rfind('.') {
        Some(idx) => idx > 0 && idx < segment.len() - 1,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> CanonicalPath {
        resolve(p, &CanonicalPath::root())
    }

    fn site() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_relative_without_extension_becomes_directory() {
        let referrer = path("/a/b.html");
        assert_eq!(resolve("sub", &referrer).as_str(), "/a/sub/");
    }

    #[test]
    fn test_relative_with_extension_stays_file() {
        let referrer = path("/a/b.html");
        assert_eq!(resolve("sub.css", &referrer).as_str(), "/a/sub.css");
    }

    #[test]
    fn test_fragment_is_irrelevant() {
        let referrer = path("/x/y.html");
        assert_eq!(resolve("/a/b#frag", &referrer), resolve("/a/b", &referrer));
        assert_eq!(resolve("/a/b#frag", &referrer).as_str(), "/a/b/");
        assert_eq!(resolve("page.html#top", &referrer).as_str(), "/x/page.html");
    }

    #[test]
    fn test_query_is_stripped() {
        let referrer = CanonicalPath::root();
        assert_eq!(resolve("/style.css?v=3", &referrer).as_str(), "/style.css");
    }

    #[test]
    fn test_dot_is_site_root() {
        for referrer in ["/", "/a/b.html", "/deep/dir/"] {
            assert!(resolve(".", &path(referrer)).is_root());
        }
    }

    #[test]
    fn test_empty_reference_fails_closed_to_root() {
        assert!(resolve("", &path("/a/b.html")).is_root());
        assert!(resolve("   ", &path("/a/b.html")).is_root());
        assert!(resolve("#only", &path("/a/b.html")).is_root());
    }

    #[test]
    fn test_parent_segments_are_resolved() {
        let referrer = path("/a/b/c.html");
        assert_eq!(resolve("../x.html", &referrer).as_str(), "/a/x.html");
        assert_eq!(resolve("../../../../x.html", &referrer).as_str(), "/x.html");
        assert_eq!(resolve("./y/../z.css", &referrer).as_str(), "/a/b/z.css");
        assert_eq!(resolve("..", &referrer).as_str(), "/a/");
    }

    #[test]
    fn test_directory_referrer_is_its_own_directory() {
        let referrer = path("/guide/");
        assert_eq!(referrer.as_str(), "/guide/");
        assert_eq!(resolve("intro.html", &referrer).as_str(), "/guide/intro.html");
    }

    #[test]
    fn test_absolute_reference_ignores_referrer() {
        let referrer = path("/a/b/c.html");
        assert_eq!(resolve("/pages/01-intro.html", &referrer).as_str(), "/pages/01-intro.html");
        assert_eq!(resolve("//double//slash/", &referrer).as_str(), "/double/slash/");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let referrer = path("/a/b.html");
        for reference in ["sub", "../x/y.js", "/q?x#y", ".", "", "a/./b/../c/"] {
            let once = resolve(reference, &referrer);
            assert_eq!(once, resolve(reference, &referrer));
            // Re-resolving a canonical path is a no-op as well
            assert_eq!(resolve(once.as_str(), &referrer), once);
        }
    }

    #[test]
    fn test_versioned_asset_counts_as_file() {
        // Inherited heuristic: "file.v2" looks like it has an extension
        assert_eq!(path("/assets/file.v2").as_str(), "/assets/file.v2");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("a.css"));
        assert!(!has_extension("sub"));
        assert!(!has_extension(".hidden"));
        assert!(!has_extension("name."));
        assert!(!has_extension(".."));
        assert!(!has_extension(""));
    }

    #[test]
    fn test_url_path_keeps_its_shape() {
        assert_eq!(CanonicalPath::from_url_path("/guide").as_str(), "/guide");
        assert!(CanonicalPath::from_url_path("").is_root());
        // "/about" is a file-style referrer: its directory is "/"
        let referrer = CanonicalPath::from_url_path("/about");
        assert_eq!(resolve("team", &referrer).as_str(), "/team/");
    }

    #[test]
    fn test_encoded_and_plain_spellings_agree() {
        let referrer = path("/docs/index.html");
        let plain = resolve("my page.html", &referrer);
        assert_eq!(plain.as_str(), "/docs/my page.html");
        assert_eq!(resolve("my%20page.html", &referrer), plain);

        // Absolute same-origin links arrive encoded by the url crate
        let Reference::Local(local) = classify("https://example.com/docs/my page.html", &site()) else {
            panic!("expected a local reference");
        };
        assert_eq!(resolve(&local, &referrer), plain);
        assert_eq!(CanonicalPath::from_url_path("/docs/my%20page.html"), plain);
    }

    #[test]
    fn test_undecodable_segment_is_kept() {
        assert_eq!(path("/raw/%FF.bin").as_str(), "/raw/%FF.bin");
        assert_eq!(path("/100%.html").as_str(), "/100%.html");
    }

    #[test]
    fn test_to_url_encodes_segments() {
        let url = path("/docs/my page.html").to_url(&site());
        assert_eq!(url.as_str(), "https://example.com/docs/my%20page.html");

        // A decoded '?' is part of the name, not a query
        let url = CanonicalPath("/a/what?.html".to_string()).to_url(&Url::parse("https://example.com/?x=1").unwrap());
        assert_eq!(url.path(), "/a/what%3F.html");
        assert_eq!(url.query(), None);

        assert_eq!(CanonicalPath::root().to_url(&site()).as_str(), "https://example.com/");
    }

    #[test]
    fn test_query_only_reference_is_the_referrer() {
        let referrer = path("/a/b.html");
        assert_eq!(resolve("?page=2", &referrer), referrer);
        assert_eq!(resolve("  ?", &referrer), referrer);
    }

    #[test]
    fn test_trailing_slash_variant() {
        assert_eq!(path("/guide.html").with_trailing_slash().as_str(), "/guide.html/");
        assert_eq!(path("/guide").with_trailing_slash().as_str(), "/guide/");
    }

    #[test]
    fn test_classify_fragment() {
        assert_eq!(classify("#section", &site()), Reference::Fragment);
    }

    #[test]
    fn test_classify_external() {
        assert_eq!(
            classify("http://other-domain.org/page", &site()),
            Reference::External("http://other-domain.org/page".into())
        );
        assert!(matches!(classify("mailto:me@example.com", &site()), Reference::External(_)));
        assert!(matches!(classify("//cdn.example.net/lib.js", &site()), Reference::External(_)));
        // Same host, different scheme is a different origin
        assert!(matches!(classify("http://example.com/a", &site()), Reference::External(_)));
    }

    #[test]
    fn test_classify_local() {
        assert_eq!(classify("pages/ch1.html", &site()), Reference::Local("pages/ch1.html".into()));
        assert_eq!(classify(" /a/b ", &site()), Reference::Local("/a/b".into()));
        assert_eq!(
            classify("https://example.com/docs/#part", &site()),
            Reference::Local("/docs/#part".into())
        );
        assert_eq!(classify("//example.com/x.css", &site()), Reference::Local("/x.css".into()));
    }

    #[test]
    fn test_classify_malformed() {
        assert!(matches!(classify("http://[::1", &site()), Reference::Malformed(_)));
    }
}
