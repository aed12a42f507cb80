//! Source descriptors and format dispatch.
//!
//! A [`Source`] says where a table comes from; [`SourceFormat`] is the closed
//! set of loaders. File formats are picked by a pure, case-sensitive
//! extension match; the file content is never sniffed.

use super::Table;
use polars::prelude::DataFrame;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a [`Table`] is loaded from.
#[derive(Debug, Clone, Default)]
pub enum Source {
    /// No source: an empty table.
    #[default]
    None,

    /// A `.csv`, `.xlsx`, `.xls` or `.json` file.
    Path(PathBuf),

    /// A connection string plus the query to run against it.
    Database {
        url: String,
        query: Option<String>,
    },

    /// An already-built table, adopted as is.
    InMemory(Table),

    /// A polars frame, converted cell by cell.
    Frame(DataFrame),
}

impl Source {
    /// Classify a string descriptor the way a caller-facing loader does.
    ///
    /// Strings with a recognized file extension are paths; anything else is a
    /// connection string, whose query may be missing.
    pub fn parse(source: &str, query: Option<&str>) -> Self {
        if SourceFormat::from_path(Path::new(source)).is_some() {
            Self::Path(PathBuf::from(source))
        } else {
            Self::Database {
                url: source.to_owned(),
                query: query.map(ToOwned::to_owned),
            }
        }
    }

    /// The loader this source dispatches to, if any.
    pub fn format(&self) -> Option<SourceFormat> {
        match self {
            Self::None => None,
            Self::Path(path) => SourceFormat::from_path(path),
            Self::Database { .. } => Some(SourceFormat::DatabaseQuery),
            Self::InMemory(_) | Self::Frame(_) => Some(SourceFormat::InMemory),
        }
    }
}

impl From<&str> for Source {
    fn from(source: &str) -> Self {
        Self::parse(source, None)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Table> for Source {
    fn from(table: Table) -> Self {
        Self::InMemory(table)
    }
}

impl From<DataFrame> for Source {
    fn from(df: DataFrame) -> Self {
        Self::Frame(df)
    }
}

/// Closed set of loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    DelimitedText,
    Spreadsheet,
    JsonTable,
    DatabaseQuery,
    InMemory,
}

impl SourceFormat {
    /// Map a file extension to its loader. Case-sensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(Self::DelimitedText),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            "json" => Some(Self::JsonTable),
            _ => None,
        }
    }

    /// Map a path to its loader by the `.<ext>` suffix of its text, so a bare
    /// `dir/.csv` counts as delimited text. Case-sensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let text = path.to_str()?;
        let (_, ext) = text.rsplit_once('.')?;
        if ext.contains(['/', std::path::MAIN_SEPARATOR]) {
            return None;
        }
        Self::from_extension(ext)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DelimitedText => "delimited-text",
            Self::Spreadsheet => "spreadsheet",
            Self::JsonTable => "json-table",
            Self::DatabaseQuery => "database-query",
            Self::InMemory => "in-memory",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
