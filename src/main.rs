use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use swarmdeck::backend::{MemoryBackend, ServiceBackend};
use swarmdeck::config::Config;
use swarmdeck::{logger, ui};

/// A terminal UI for swarm services
#[derive(Debug, Parser)]
#[command(name = "swarmdeck", version, about)]
struct Args {
    /// Path to a configuration file (defaults to ./swarmdeck.toml or the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    if let Some(path) = logger::init(&config.logging)? {
        log::info!("Logging to {}", path.display());
    }

    let backend: Arc<dyn ServiceBackend> = Arc::new(MemoryBackend::demo());

    // Run the TUI application
    ui::run_app(config, backend).await?;

    Ok(())
}
