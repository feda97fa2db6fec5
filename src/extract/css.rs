// src/extract/css.rs
// =============================================================================
// This module extracts @import targets from stylesheets.
//
// We tokenize with `cssparser` rather than matching text so that comments,
// strings and nested blocks are handled the way a browser would. Only
// top-level rules are looked at: the parser skips over the contents of `{...}`
// blocks unless asked to enter them, so `url(...)` inside declarations never
// shows up here.
//
// Both import forms are supported:
//   @import "base.css";
//   @import url(base.css);
//   @import url("base.css") screen;
// =============================================================================

use cssparser::{ParseError, Parser, ParserInput, Token};

// What followed an @import keyword
enum ImportTarget {
    Href(String),
    UrlFunction,
    Nothing,
}

// Returns the raw href of every top-level @import rule, in order
pub fn extract_css_imports(css: &str) -> Vec<String> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut imports = Vec::new();

    loop {
        let is_import = match parser.next() {
            Ok(Token::AtKeyword(name)) => name.eq_ignore_ascii_case("import"),
            Ok(_) => false,
            Err(_) => break, // end of input
        };
        if !is_import {
            continue;
        }

        let target = match parser.next() {
            Ok(Token::QuotedString(href)) | Ok(Token::UnquotedUrl(href)) => {
                ImportTarget::Href(href.to_string())
            }
            Ok(Token::Function(name)) if name.eq_ignore_ascii_case("url") => ImportTarget::UrlFunction,
            _ => ImportTarget::Nothing,
        };

        match target {
            ImportTarget::Href(href) => imports.push(href),
            ImportTarget::UrlFunction => {
                // url("quoted.css") arrives as a function token wrapping a string
                let href: Result<String, ParseError<'_, ()>> =
                    parser.parse_nested_block(|nested| Ok(nested.expect_string()?.to_string()));
                if let Ok(href) = href {
                    imports.push(href);
                }
            }
            ImportTarget::Nothing => {}
        }
    }

    imports
}
