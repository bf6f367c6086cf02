mod app;
mod config;
mod engine;
mod ingest;
mod snapshot;
mod state;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use app::ViewerApp;
use clap::Parser;
use config::{window_conf, ViewerConfig};
use log::{error, info};
use state::WorldState;

/// Command-line arguments for SwarmView.
#[derive(Parser)]
#[command(name = "SwarmView", version, about = "Live spectator view for drone exploration matches")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the report listen address from the config.
    #[arg(short, long)]
    listen: Option<String>,
}

/// Loads the viewer configuration from a TOML file or uses defaults.
fn load_config(path: Option<PathBuf>) -> Result<ViewerConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            let config =
                toml::from_str(&content).context("failed to parse config file")?;
            info!("loaded config from '{}'", path.display());
            Ok(config)
        }
        None => {
            info!("no config file provided, using defaults");
            Ok(ViewerConfig::default())
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return;
        }
    };
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    let state = Arc::new(WorldState::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    let listener = match ingest::spawn_listener(
        &config.listen_addr,
        Arc::clone(&state),
        Arc::clone(&shutdown),
    ) {
        Ok(listener) => listener,
        Err(e) => {
            error!("{e:#}");
            return;
        }
    };
    info!("listening for agent reports on {}", listener.local_addr());

    let mut viewer = ViewerApp::new(config, state, Arc::clone(&shutdown));
    viewer.run().await;

    // run() has set the shutdown flag; wait for the listener so the socket
    // is released before the window goes away.
    listener.join();
    info!("viewer closed");
}
