//! cosmos-dump
//!
//! Backs up every container of a Cosmos DB database to local JSON files,
//! one file per document.
//!
//! # Usage
//!
//! ```bash
//! cosmos-dump "AccountEndpoint=https://acct.documents.azure.com:443/;AccountKey=...;" shop
//! # -> ./shop-2024-05-01/<container>/<id>.json
//! ```

use nu_ansi_term::Color;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use cosmos_dump::cli::CliInterface;
use cosmos_dump::error::Result;
use cosmos_dump::export::{self, BackupSummary};

/// Exit code for every kind of failure.
const EXIT_FAILURE: i32 = -1;

/// Application entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let color = !std::env::args().any(|arg| arg == "--no-color");

    if let Err(e) = run().await {
        let message = e.to_string();
        if color {
            eprintln!("{}", Color::Red.paint(message));
        } else {
            eprintln!("{message}");
        }
        std::process::exit(EXIT_FAILURE);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Run the backup and print the confirmation line
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    let summary = export::run(cli.connection_string(), cli.database(), cli.config()).await?;

    print_summary(&cli, &summary);
    Ok(())
}

fn print_summary(cli: &CliInterface, summary: &BackupSummary) {
    let line = format!(
        "Finished backing up database '{}': {} container(s), {} document(s) in {}",
        cli.database(),
        summary.containers,
        summary.documents,
        summary.directory.display()
    );

    if cli.color_enabled() {
        println!("{}", Color::Green.paint(line));
    } else {
        println!("{line}");
    }
}

/// Initialize logging system based on configuration
///
/// `RUST_LOG` takes precedence over the configured level when set.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(cli.color_enabled());

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
