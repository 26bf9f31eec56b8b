// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Colloquy - a per-contact conversational backend.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ingest;
mod serve;
mod show_config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colloquy_config::ColloquyConfig;

/// Colloquy - a per-contact conversational backend.
#[derive(Parser, Debug)]
#[command(name = "colloquy", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook and admin server.
    Serve,
    /// Rebuild the knowledge store from a directory of documents.
    Ingest {
        /// Source directory (defaults to `ingest.source_dir`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> ColloquyConfig {
    let loaded = match path {
        Some(path) => colloquy_config::load_and_validate_path(path),
        None => colloquy_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            colloquy_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Ingest { dir }) => ingest::run_ingest(config, dir).await,
        Some(Commands::Config) => show_config::print_config(&config),
        None => {
            println!("colloquy: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber once per process.
///
/// `RUST_LOG` wins over the configured level.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("colloquy={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
