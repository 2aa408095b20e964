//! Export pipeline
//!
//! A backup run is three stages executed one after another:
//!
//! 1. **Connector**: parse the connection string and resolve the database
//!    (see [`crate::connection`])
//! 2. **Enumerator**: list every container id through a paginated feed
//! 3. **Exporter**: for each container, create its folder and write each
//!    document of its feed to `<id>.json`
//!
//! The exporter works against the [`DocumentSource`] and [`PagedFeed`]
//! traits, so the same code path runs against Cosmos DB and against the
//! in-memory feeds used in tests.
//!
//! # Example
//!
//! ```no_run
//! use cosmos_dump::config::Config;
//! use cosmos_dump::export;
//!
//! # async fn demo() -> cosmos_dump::Result<()> {
//! let summary = export::run(
//!     "AccountEndpoint=https://acct.documents.azure.com:443/;AccountKey=...;",
//!     "shop",
//!     &Config::default(),
//! )
//! .await?;
//! println!("{} document(s) written to {}", summary.documents, summary.directory.display());
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod enumerator;
pub mod layout;
pub mod progress;
pub mod streaming;
pub mod writer;

pub use coordinator::{BackupCoordinator, BackupSummary};
pub use enumerator::list_containers;
pub use progress::ProgressTracker;
pub use streaming::{Document, DocumentSource, PagedFeed, collect_all};
pub use writer::DocumentWriter;

use std::io::IsTerminal;

use tracing::debug;

use crate::config::{Config, LogLevel};
use crate::connection::CosmosClient;
use crate::error::Result;

/// Back up a whole database into `<output dir>/<database>-<local date>`
///
/// # Arguments
/// * `connection_string` - Cosmos DB account connection string
/// * `database` - Name of the database to export
/// * `config` - Effective configuration
///
/// # Returns
/// * `Result<BackupSummary>` - Run statistics or the first error
pub async fn run(connection_string: &str, database: &str, config: &Config) -> Result<BackupSummary> {
    let today = chrono::Local::now().date_naive();
    let backup_dir = layout::backup_dir(&config.output.directory, database, today)?;

    let client = CosmosClient::new(connection_string, &config.connection)?;
    let database = client.database(database);
    debug!("Resolved database '{}' at {}", database.name(), client.endpoint());

    let show_progress = std::io::stderr().is_terminal()
        && matches!(config.logging.level, LogLevel::Info | LogLevel::Warn);

    BackupCoordinator::new(&database, backup_dir)
        .with_pretty(config.output.pretty)
        .with_progress(show_progress)
        .execute()
        .await
}
