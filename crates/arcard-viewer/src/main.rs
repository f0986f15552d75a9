//! arcard Viewer - Desktop entry point
//!
//! Runs the overlay against a simulated image tracker, or prints the computed
//! overlay layout for given image extents.

mod app;
mod tracker;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use arcard_core::config::{load_config, save_default_config};
use arcard_core::Extents;

#[derive(Parser, Debug)]
#[command(name = "arcard")]
#[command(about = "AR business card overlay viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "arcard.toml")]
    config: PathBuf,

    /// Directory the overlay model paths are resolved against
    #[arg(short, long, default_value = "assets")]
    assets: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the overlay layout for the given image extents as JSON and exit
    #[arg(long, num_args = 2, value_names = ["EXTENT_X", "EXTENT_Z"])]
    print_layout: Option<Vec<f32>>,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("arcard v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        save_default_config(&args.config)
            .with_context(|| format!("writing {}", args.config.display()))?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let config = load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if let Some(extents) = args.print_layout {
        let [extent_x, extent_z] = extents.as_slice() else {
            anyhow::bail!("--print-layout takes exactly two values");
        };
        let layout = config.layout.compute(Extents::new(*extent_x, *extent_z))?;
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    info!(
        assets = %args.assets,
        dispatch = ?config.dispatch.mode,
        "Configuration loaded"
    );

    app::run(config, args.assets);
    Ok(())
}
