// src/mirror/mod.rs
// =============================================================================
// This module handles mirroring a website to disk.
//
// Submodules:
// - path: classify hrefs and resolve them to canonical site paths
// - visited: the at-most-once ledger of scheduled paths
// - store: where and how files land in the mirror directory
// - dispatch: per-content-type handlers (HTML, CSS, passthrough)
// - driver: the worker pool that ties everything together
// =============================================================================

mod dispatch;
mod driver;
mod path;
mod store;
mod visited;

pub use driver::{Mirror, MirrorReport};
