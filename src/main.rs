//! Rigging - a static asset pipeline.
//!
//! Picks one engine per asset class (scripts, styles, templates), builds the
//! three assets and serves them as `/app.js`, `/style.css` and `/templates.js`.

mod asset;
mod bundle;
mod cli;
mod compiler;
mod config;
mod engine;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::RiggingConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = RiggingConfig::load(&cli)?;
    debug!("config"; "{} ({})", config.config_path.display(), config.environment.as_str());

    match &cli.command {
        Commands::Build { output, manifest } => {
            cli::build::build_assets(&config, output, *manifest).map(|_| ())
        }
        Commands::Tags => cli::tags::print_tags(&config),
        Commands::Check => cli::check::check_config(&config),
    }
}
