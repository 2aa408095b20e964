//! Error handling for the backup pipeline.
//!
//! Every failure in the tool is funnelled into [`DumpError`], which `main`
//! prints once and turns into a non-zero exit code. The `cosmos` submodule
//! extracts readable messages from the error bodies returned by the
//! Cosmos DB gateway.
//!
//! # Example
//!
//! ```rust
//! use cosmos_dump::error::{DataError, DumpError, Result};
//!
//! fn require_id(id: Option<&str>) -> Result<String> {
//!     id.map(str::to_owned).ok_or_else(|| {
//!         DumpError::from(DataError::MissingId {
//!             container: "orders".to_string(),
//!         })
//!     })
//! }
//!
//! assert!(require_id(None).is_err());
//! ```

pub mod cosmos;
pub mod kinds;

pub use cosmos::ErrorInfo;
pub use kinds::{ConfigError, ConnectionError, DataError, DumpError, QueryError, Result};
