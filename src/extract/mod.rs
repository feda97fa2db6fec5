// src/extract/mod.rs
// =============================================================================
// This module pulls raw references out of fetched documents.
//
// Submodules:
// - html: stylesheet and anchor hrefs from HTML pages
// - css: @import targets from stylesheets
//
// Both return the hrefs exactly as written; classification and path
// resolution happen in mirror::path.
// =============================================================================

mod css;
mod html;

pub use css::extract_css_imports;
pub use html::extract_html_refs;
