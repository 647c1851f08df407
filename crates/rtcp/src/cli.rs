use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod plan;
pub mod status;
pub mod transform;

/// Logs go to stderr so stdout carries only command output. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::from_file(path)?;
    config.validate()?;
    tracing::info!(
        config = %path.display(),
        mode = ?config.mode,
        pivot = ?config.machine.pivot(),
        "loaded machine configuration"
    );
    Ok(config)
}

/// Five-axis coordinates given on the command line
#[derive(Args, Debug, Clone, Copy)]
pub struct PoseArgs {
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub z: f64,
    /// A angle in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub a: f64,
    /// C angle in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub c: f64,
}
