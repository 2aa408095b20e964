//! cosmos-dump library
//!
//! Exports every container of a Cosmos DB (SQL API) database to local JSON
//! files, one file per document, under a dated backup folder.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: Cosmos DB connection string, request signing and query feeds
//! - `error`: Error types and handling
//! - `export`: Container enumeration and per-document export
//!
//! # Example
//!
//! ```no_run
//! use cosmos_dump::{config::Config, connection::CosmosClient, export};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = CosmosClient::new(
//!         "AccountEndpoint=https://acct.documents.azure.com:443/;AccountKey=...;",
//!         &config.connection,
//!     )?;
//!
//!     let database = client.database("shop");
//!     let containers = export::list_containers(&database).await?;
//!     println!("{} container(s)", containers.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;

// Re-export commonly used types
pub use config::Config;
pub use connection::{CosmosClient, Database};
pub use error::{DumpError, Result};
pub use export::{BackupCoordinator, BackupSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
