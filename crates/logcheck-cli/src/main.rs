//! logcheck CLI tool.
//!
//! Usage:
//! ```bash
//! logcheck check [OPTIONS] [PATH]
//! logcheck list-checks
//! logcheck init
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Structured-logging linter for Go code using klog and logr
#[derive(Parser)]
#[command(name = "logcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the settings file (logcheck.toml)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check Go sources below a directory
    Check(CheckArgs),

    /// List available checks
    ListChecks,

    /// Write a logcheck.toml into the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Options of `logcheck check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to analyze (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Override document with per-file check toggles
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail instead of skipping files that do not parse
    #[arg(long)]
    pub fail_on_parse_error: bool,

    /// Enable or disable the structured check
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = parse_flag_bool)]
    pub check_structured: Option<bool>,

    /// Enable or disable the parameters check
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = parse_flag_bool)]
    pub check_parameters: Option<bool>,

    /// Enable or disable the contextual check
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = parse_flag_bool)]
    pub check_contextual: Option<bool>,

    /// Enable or disable the with-helpers check
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = parse_flag_bool)]
    pub check_with_helpers: Option<bool>,

    /// Enable or disable the verbosity-zero check
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = parse_flag_bool)]
    pub check_verbosity_zero: Option<bool>,

    /// Enable or disable the key check
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = parse_flag_bool)]
    pub check_key: Option<bool>,

    /// Enable or disable the deprecations check
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = parse_flag_bool)]
    pub check_deprecations: Option<bool>,
}

impl CheckArgs {
    /// Check toggles given on the command line, by check name.
    pub fn check_flags(&self) -> [(&'static str, Option<bool>); 7] {
        [
            ("structured", self.check_structured),
            ("parameters", self.check_parameters),
            ("contextual", self.check_contextual),
            ("with-helpers", self.check_with_helpers),
            ("verbosity-zero", self.check_verbosity_zero),
            ("key", self.check_key),
            ("deprecations", self.check_deprecations),
        ]
    }
}

fn parse_flag_bool(value: &str) -> Result<bool, String> {
    logcheck_core::parse_bool(value).ok_or_else(|| format!("invalid boolean {value:?}"))
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Annotated source snippets.
    Fancy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(args) => commands::check::run(&args, cli.settings.as_deref()),
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
