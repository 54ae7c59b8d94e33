//! # Platformer Engine
//!
//! Headless runner for the platformer simulation core.
//!
//! Loads a level and an input script from `platformer.toml` (or the path
//! given as the first argument), then steps the level at a fixed tick rate
//! and logs what happens.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("platformer=info".parse()?))
        .init();

    info!("Platformer starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = EngineConfig::path_from_args(std::env::args());
    let mut config = EngineConfig::load_from(&path);
    if !path.exists() {
        if let Err(e) = config.save_to(&path) {
            warn!("Failed to write default config: {e}");
        }
    }
    config.validate();

    let summary = app::run(&config)?;
    if summary.protagonist_dead {
        info!(tick = summary.ticks_run, "Game over");
    }

    info!("Platformer shutdown complete");
    Ok(())
}
