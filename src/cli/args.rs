//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Environment;

/// Rigging asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true, disable_version_flag = true)]
#[command(arg(clap::Arg::new("version").long("version").action(clap::ArgAction::Version).help("Print version")))]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: rigging.toml)
    #[arg(short = 'C', long, global = true, default_value = "rigging.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Deployment environment (overrides `environment` in the config)
    #[arg(long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Minify the produced assets (`--compress` or `--compress=false`)
    #[arg(long, global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub compress: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the bundle and write the assets to disk
    #[command(visible_alias = "b")]
    Build {
        /// Output directory (relative to the current directory)
        #[arg(short, long, default_value = "public", value_hint = clap::ValueHint::DirPath)]
        output: PathBuf,

        /// Also write rigging-manifest.json
        #[arg(short, long)]
        manifest: bool,
    },

    /// Build the bundle and print the HTML tags
    #[command(visible_alias = "t")]
    Tags,

    /// Validate configuration and sources without compiling
    #[command(visible_alias = "c")]
    Check,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_tags(&self) -> bool {
        matches!(self.command, Commands::Tags)
    }
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check)
    }
}
