//! # Linelight - A Line-by-Line Highlighting Service
//!
//! Serves `POST /highlight` over HTTP: source code in, HTML markup out.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with defaults (127.0.0.1:3001)
//! cargo run
//!
//! # Custom port and config file
//! cargo run -- --port 8080 --config ./linelight.toml
//!
//! # Try it
//! curl -s localhost:3001/highlight -H 'content-type: application/json' \
//!     -d '{"code": "print(1)", "filename": "a.py"}'
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use linelight_core::{Config, Highlighter};
use linelight_syntax::TreeSitterEngine;

/// Linelight - a line-by-line syntax highlighting service
#[derive(Parser, Debug)]
#[command(name = "linelight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LINELIGHT_PORT")]
    port: Option<u16>,

    /// Maximum number of cached responses (0 disables the cache)
    #[arg(long, value_name = "N")]
    cache_capacity: Option<usize>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Loads the config file and applies command line overrides.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache.capacity = capacity;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over -v
    let log_level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();

    tracing::info!("Starting Linelight v{}", env!("CARGO_PKG_VERSION"));

    let config = args.resolve_config()?;
    tracing::info!(
        "Configuration loaded: port {}, cache capacity {}",
        config.server.port,
        config.cache.capacity
    );

    let engine = TreeSitterEngine::new().with_class_prefix(config.markup.class_prefix.clone());
    let highlighter = Arc::new(Highlighter::from_config(Arc::new(engine), &config));

    linelight_server::serve(&config.server, highlighter)
        .await
        .context("Server error")?;

    Ok(())
}
