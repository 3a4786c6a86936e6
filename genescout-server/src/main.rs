use anyhow::{Context, Result};
use clap::Parser;
use genescout::{config::CliOverrides, FinderConfig, GeneFinder};
use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// DNA file to search (overrides the config file and DNA_FILE_PATH)
    #[arg(short = 'f', long)]
    dna_file: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Scan buffer size in bytes
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            dna_file_path: self.dna_file.clone(),
            buffer_size: self.buffer_size,
            thread_count: self.threads,
            log_level: self.log_level.clone(),
            bind_addr: self.bind,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = FinderConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.overrides());
    config.validate().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let finder = GeneFinder::open_with_options(&config.dna_file_path, config.finder_options())
        .with_context(|| format!("failed to open DNA file {}", config.dna_file_path.display()))?;

    let state = routes::AppState::new(Arc::new(finder));
    let app = routes::create_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("Starting genescout server on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
