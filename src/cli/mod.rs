//! Command-line interface for cosmos-dump
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - The two-argument usage contract (connection string, database name)
//! - Configuration loading and CLI overrides

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::{DumpError, Result};

/// Message shown for any argument count other than two.
pub const USAGE_MESSAGE: &str =
    "Please provide the connection string and database name as arguments.";

/// Export every container of a Cosmos DB database to JSON files
#[derive(Parser, Debug)]
#[command(
    name = "cosmos-dump",
    version,
    about = "Back up a Cosmos DB database to one JSON file per document",
    long_about = "Back up a Cosmos DB database to one JSON file per document.

Creates <database>-<YYYY-MM-DD>/<container>/<id>.json in the output directory."
)]
pub struct CliArgs {
    /// Connection string followed by database name
    ///
    /// Connection string format: AccountEndpoint=https://...;AccountKey=...;
    #[arg(value_name = "ARGS", num_args = 0..)]
    pub positional: Vec<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Directory in which the backup folder is created
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of items requested per page
    #[arg(long, value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Write single-line JSON instead of indented JSON
    #[arg(long)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (log every page and document)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load configuration
    ///
    /// `--help` and `--version` print and exit the process with status 0.
    /// Every other parse failure becomes a usage error.
    pub fn new() -> Result<Self> {
        let args = match CliArgs::try_parse() {
            Ok(args) => args,
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => return Err(DumpError::Usage(format!("{USAGE_MESSAGE}\n\n{e}"))),
        };

        Self::from_args(args)
    }

    /// Validate already parsed arguments and load configuration
    pub fn from_args(args: CliArgs) -> Result<Self> {
        Self::validate_positional(&args.positional)?;

        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, &args);
        config.validate()?;

        Ok(Self { args, config })
    }

    /// Exactly two non-empty positional arguments are accepted
    fn validate_positional(positional: &[String]) -> Result<()> {
        match positional {
            [conn, db] if !conn.trim().is_empty() && !db.trim().is_empty() => Ok(()),
            _ => Err(DumpError::Usage(USAGE_MESSAGE.to_string())),
        }
    }

    /// Get the connection string
    pub fn connection_string(&self) -> &str {
        &self.args.positional[0]
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.args.positional[1]
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether console output may use colors
    pub fn color_enabled(&self) -> bool {
        !self.args.no_color
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if let Some(dir) = &args.output_dir {
            config.output.directory = dir.clone();
        }

        if args.compact {
            config.output.pretty = false;
        }

        if let Some(count) = args.page_size {
            config.connection.max_item_count = Some(count);
        }

        config.logging.level = if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }
}
