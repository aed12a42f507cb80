//! Centralized error handling for tabclean.
//!
//! Most of the crate never surfaces an error: construction falls back to an
//! empty [`Table`](crate::table::Table) and operators log and do nothing when
//! they cannot apply. Errors are returned from the explicit channels only:
//!
//! - [`Table::try_from_source`](crate::table::Table::try_from_source)
//! - [`RowTextCodec`](crate::codec::RowTextCodec) reads and writes
//! - [`Table::to_text_export`](crate::table::Table::to_text_export)
//! - recipe and option loading
//!
//! ```no_run
//! use tabclean::error::{Result, ResultExt as _};
//! use tabclean::codec::RowTextCodec;
//!
//! fn header_of(path: &str) -> Result<Vec<String>> {
//!     let rows = RowTextCodec::new(path)
//!         .read()
//!         .context("Failed to read header")?;
//!     Ok(rows.into_iter().next().unwrap_or_default())
//! }
//! ```

use std::fmt;

/// Main error type for tabclean operations.
#[derive(Debug)]
pub enum TabcleanError {
    /// I/O errors (opening, reading, writing files)
    Io(std::io::Error),

    /// Malformed delimited text or JSON
    Parse(String),

    /// Spreadsheet decoding errors
    Spreadsheet(String),

    /// Database connection or query errors
    Database(String),

    /// A table violating the rectangular/unique-name invariants
    InvalidTable(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// Source descriptor no loader accepts
    UnsupportedSource(String),

    /// Configuration and recipe errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for TabcleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::Spreadsheet(msg) => write!(f, "Spreadsheet error: {msg}"),
            Self::Database(msg) => write!(f, "Database error: {msg}"),
            Self::InvalidTable(msg) => write!(f, "Invalid table: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::UnsupportedSource(msg) => write!(f, "Unsupported source: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TabcleanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TabcleanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TabcleanError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => Self::Io(io),
                other => Self::Parse(format!("{other:?}")),
            }
        } else {
            Self::Parse(err.to_string())
        }
    }
}

impl From<anyhow::Error> for TabcleanError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the whole context chain on one line
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for TabcleanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for TabcleanError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<calamine::Error> for TabcleanError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<sqlx::Error> for TabcleanError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for tabclean operations.
pub type Result<T> = std::result::Result<T, TabcleanError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TabcleanError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| with_message(e.into(), msg.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| with_message(e.into(), f()))
    }
}

/// Prefix `msg` to an error. I/O errors stay `Io` and keep their kind.
fn with_message(err: TabcleanError, msg: String) -> TabcleanError {
    match err {
        TabcleanError::Io(e) => {
            TabcleanError::Io(std::io::Error::new(e.kind(), format!("{msg}: {e}")))
        }
        other => TabcleanError::Other(format!("{msg}: {other}")),
    }
}
