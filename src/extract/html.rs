// src/extract/html.rs
// =============================================================================
// This module extracts references from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Only two kinds of references matter for mirroring:
// - <link rel="stylesheet" href="...">
// - <a href="...">
//
// Images and scripts are not followed. Hrefs are returned raw; deciding what
// they point at is the job of mirror::path.
// =============================================================================

use scraper::{Html, Selector};

// Stylesheet links first, then anchors, each in document order.
//
// Example:
//   html = "<link rel='stylesheet' href='css/a.css'><a href='/docs'>Docs</a>"
//   result = ["css/a.css", "/docs"]
pub fn extract_html_refs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // `~=` matches one word of a space-separated rel list ("alternate stylesheet")
    let stylesheets = Selector::parse(r#"link[rel~="stylesheet"][href]"#).unwrap();
    let anchors = Selector::parse("a[href]").unwrap();

    let mut refs = Vec::new();
    for selector in [&stylesheets, &anchors] {
        for element in document.select(selector) {
            if let Some(href) = element.value().attr("href") {
                refs.push(href.to_string());
            }
        }
    }
    refs
}
