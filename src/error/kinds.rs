use std::path::PathBuf;
use std::{fmt, io};

use crate::error::cosmos::ErrorInfo;

/// Crate-wide `Result` type using [`DumpError`] as the error.
pub type Result<T> = std::result::Result<T, DumpError>;

/// Top-level error type for the backup tool.
///
/// The variants mirror the failure classes of a run. They are only
/// distinguished in the printed message; every one of them ends the
/// process with the same exit code.
#[derive(Debug)]
pub enum DumpError {
    /// Wrong command-line usage.
    Usage(String),

    /// Connection string or transport errors.
    Connection(ConnectionError),

    /// A feed page could not be fetched or decoded.
    Query(QueryError),

    /// A document could not be turned into a file.
    Data(DataError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// HTTP client errors.
    Http(reqwest::Error),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// A required `Key=Value` entry is absent from the connection string.
    MissingField(String),

    /// The connection string is not a list of `Key=Value` pairs.
    InvalidConnectionString(String),

    /// The account endpoint is not a usable URL.
    InvalidEndpoint(String),

    /// The account key is not valid base64.
    InvalidKey(String),

    /// The HTTP client could not be built.
    ClientBuild(String),
}

/// Query-specific errors.
#[derive(Debug)]
pub enum QueryError {
    /// The service answered a page request with a non-success status.
    Status {
        status: u16,
        resource: String,
        info: ErrorInfo,
    },

    /// The response body did not have the expected shape.
    MalformedResponse { resource: String, reason: String },
}

/// Document-specific errors.
#[derive(Debug)]
pub enum DataError {
    /// The document has no `id` field.
    MissingId { container: String },

    /// The `id` field cannot be rendered as a string.
    InvalidId { container: String, found: String },

    /// A container or document id cannot be used as a path component.
    UnsafeName { kind: &'static str, name: String },

    /// The document could not be serialized.
    Serialize(serde_json::Error),

    /// Writing the output file failed.
    WriteFailed { path: PathBuf, source: io::Error },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::Usage(msg) => write!(f, "{msg}"),
            DumpError::Connection(e) => write!(f, "Connection error: {e}"),
            DumpError::Query(e) => write!(f, "Query error: {e}"),
            DumpError::Data(e) => write!(f, "Data error: {e}"),
            DumpError::Config(e) => write!(f, "Configuration error: {e}"),
            DumpError::Io(e) => write!(f, "I/O error: {e}"),
            DumpError::Http(e) => write!(f, "Request failed: {e}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::MissingField(field) => {
                write!(f, "Connection string is missing '{field}'")
            }
            ConnectionError::InvalidConnectionString(msg) => {
                write!(f, "Invalid connection string: {msg}")
            }
            ConnectionError::InvalidEndpoint(msg) => write!(f, "Invalid account endpoint: {msg}"),
            ConnectionError::InvalidKey(msg) => write!(f, "Invalid account key: {msg}"),
            ConnectionError::ClientBuild(msg) => write!(f, "Failed to build HTTP client: {msg}"),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Status {
                status,
                resource,
                info,
            } => {
                write!(f, "{resource} returned status {status}")?;
                if let Some(code) = &info.code {
                    write!(f, " ({code})")?;
                }
                if let Some(message) = &info.message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
            QueryError::MalformedResponse { resource, reason } => {
                write!(f, "Unexpected response from {resource}: {reason}")
            }
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::MissingId { container } => {
                write!(f, "Document in container '{container}' has no 'id' field")
            }
            DataError::InvalidId { container, found } => write!(
                f,
                "Document in container '{container}' has an 'id' that is not a scalar: {found}"
            ),
            DataError::UnsafeName { kind, name } => {
                write!(f, "The {kind} id '{name}' cannot be used as a file name")
            }
            DataError::Serialize(e) => write!(f, "Failed to serialize document: {e}"),
            DataError::WriteFailed { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DumpError::Io(e) => Some(e),
            DumpError::Http(e) => Some(e),
            DumpError::Data(DataError::WriteFailed { source, .. }) => Some(source),
            DumpError::Data(DataError::Serialize(e)) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConnectionError {}
impl std::error::Error for QueryError {}
impl std::error::Error for DataError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to DumpError ========================= */

impl From<io::Error> for DumpError {
    fn from(err: io::Error) -> Self {
        DumpError::Io(err)
    }
}

impl From<reqwest::Error> for DumpError {
    fn from(err: reqwest::Error) -> Self {
        DumpError::Http(err)
    }
}

impl From<ConnectionError> for DumpError {
    fn from(err: ConnectionError) -> Self {
        DumpError::Connection(err)
    }
}

impl From<QueryError> for DumpError {
    fn from(err: QueryError) -> Self {
        DumpError::Query(err)
    }
}

impl From<DataError> for DumpError {
    fn from(err: DataError) -> Self {
        DumpError::Data(err)
    }
}

impl From<ConfigError> for DumpError {
    fn from(err: ConfigError) -> Self {
        DumpError::Config(err)
    }
}
