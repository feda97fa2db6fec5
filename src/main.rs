// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = some resources failed, 2 = error)
// =============================================================================

mod cli;
mod config;
mod error;
mod extract;
mod fetch;
mod mirror;
mod serve;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::MirrorConfig;
use fetch::HttpFetcher;
use mirror::{Mirror, MirrorReport};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins; otherwise info (or debug with --verbose) for this crate only
fn init_logging(verbose: bool) {
    let default = if verbose { "site_mirror=debug" } else { "site_mirror=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Download {
            site_url,
            output,
            workers,
            timeout,
            json,
        } => handle_download(&site_url, output, workers, timeout, json).await,
        Commands::Serve { port, dir } => {
            serve::serve(&dir, port).await?;
            Ok(0)
        }
    }
}

// Handles the 'download' subcommand
async fn handle_download(
    site_url: &str,
    output: PathBuf,
    workers: usize,
    timeout: u64,
    json: bool,
) -> Result<i32> {
    let config = MirrorConfig::new(site_url, output, workers, timeout)?;
    let fetcher = HttpFetcher::new(config.timeout)?;

    // Ctrl-C stops new downloads; in-flight ones finish so no file is cut short
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing in-flight downloads");
            on_signal.cancel();
        }
    });

    let report = Mirror::new(&config, Arc::new(fetcher))
        .with_cancellation(cancel)
        .run()
        .await
        .with_context(|| format!("mirroring {} into {}", config.site, config.output.display()))?;

    print_report(&report, &config, json)?;

    if report.failed > 0 || report.cancelled {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_report(report: &MirrorReport, config: &MirrorConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("📊 Mirror of {} in {}:", config.site, config.output.display());
    println!("   💾 Saved: {}", report.persisted);
    println!("   🌐 Requests: {}", report.fetched);
    println!("   🔁 Slash retries: {}", report.retried);
    println!("   ❌ Failed: {}", report.failed);
    println!("   ❓ Unhandled types: {}", report.unhandled);
    println!("   ↗️  External links skipped: {}", report.external);
    if report.malformed > 0 {
        println!("   ⚠️  Malformed references: {}", report.malformed);
    }
    if report.cancelled {
        println!("   ⏹️  Stopped early (interrupted)");
    }
    Ok(())
}
