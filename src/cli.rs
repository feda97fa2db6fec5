// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things). Every option can also be
// set through an environment variable (the `env = ...` attributes).
// =============================================================================

use crate::config::{
    DEFAULT_OUTPUT_DIR, DEFAULT_PORT, DEFAULT_SITE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "site-mirror",
    version,
    about = "Download a website for offline reading and serve the copy",
    long_about = "site-mirror crawls a website, saves every HTML page, stylesheet and \
                  downloadable file it links to, and serves the result locally."
)]
pub struct Cli {
    /// Show debug logs (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mirror a website into a local directory
    ///
    /// Any previous mirror in the output directory is deleted first.
    ///
    /// Example: site-mirror download https://www.composingprograms.com -o site
    Download {
        /// Root URL of the site to mirror
        #[arg(env = "SITE_MIRROR_URL", default_value = DEFAULT_SITE_URL)]
        site_url: String,

        /// Directory to write the mirror into
        #[arg(short, long, env = "SITE_MIRROR_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Number of concurrent downloads
        #[arg(long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve a mirrored site over HTTP
    ///
    /// Example: site-mirror serve --port 8000
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "SITE_MIRROR_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Directory containing the mirror
        #[arg(short, long, env = "SITE_MIRROR_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        dir: PathBuf,
    },
}
