//! The in-memory table and its cleaning operators.
//!
//! A [`Table`] wraps a polars [`DataFrame`]: an ordered set of uniquely named,
//! typed columns of equal length with native nulls. Cells cross the API as
//! [`Cell`]s: `Some(Value)` or `None` for null.
//!
//! # Loading
//!
//! Construction never fails. A bad path, an unsupported extension, a
//! connection string without a query or a driver error all log a warning and
//! leave an empty table; [`Table::load_error`] keeps the message for callers
//! who need to tell "empty" from "failed". Use [`Table::try_from_source`]
//! to get the error instead.
//!
//! ```no_run
//! use tabclean::table::Table;
//!
//! let mut table = Table::load("orders.csv", None);
//! if table.is_empty() {
//!     eprintln!("nothing loaded: {:?}", table.load_error());
//! }
//!
//! table.nullify_defaults(None);
//! table.remove_null_values();
//! table.remove_duplicates();
//! table.remove_outliers("amount", 0.25, 0.75, 1.5);
//! table.to_text_export("orders_clean.csv")?;
//! # Ok::<(), tabclean::error::TabcleanError>(())
//! ```

pub mod cleaning;
pub mod loaders;
pub mod source;
pub mod value;

pub use source::{Source, SourceFormat};
pub use value::{Cell, Value};

use crate::config::TableOptions;
use crate::error::Result;
use polars::prelude::DataFrame;
use std::collections::HashSet;
use value::cell_from_any;

/// A named column of cells, used to assemble a table cell by cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }
}

/// Rectangular, labeled, in-memory dataset backed by a polars frame.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    options: TableOptions,
    load_error: Option<String>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            df: DataFrame::empty(),
            options: TableOptions::default(),
            load_error: None,
        }
    }
}

impl PartialEq for Table {
    /// Tables are equal when their frames are, nulls included; options and
    /// load state are not part of the data.
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

impl Table {
    /// An empty table: no columns, no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a string descriptor (file path or connection string).
    ///
    /// See [`Source::parse`] for how the string is classified.
    pub fn load(source: &str, query: Option<&str>) -> Self {
        Self::from_source(Source::parse(source, query))
    }

    /// Load from `source` with default options, falling back to an empty
    /// table on failure.
    pub fn from_source(source: impl Into<Source>) -> Self {
        Self::from_source_with_options(source, TableOptions::default())
    }

    /// Load from `source`, falling back to an empty table on failure.
    pub fn from_source_with_options(source: impl Into<Source>, options: TableOptions) -> Self {
        let source: Source = source.into();
        let format = source.format();
        match Self::try_from_source(source, options.clone()) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(
                    "Error initializing table from {} source: {e}. Creating empty table instead.",
                    format.map_or("unknown", SourceFormat::as_str)
                );
                Self {
                    df: DataFrame::empty(),
                    options,
                    load_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Load from `source`, returning the failure instead of falling back.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unsupported or its loader fails.
    pub fn try_from_source(source: impl Into<Source>, options: TableOptions) -> Result<Self> {
        let source: Source = source.into();
        let df = match source {
            Source::None => DataFrame::empty(),
            Source::InMemory(table) => table.df,
            Source::Frame(df) => df,
            Source::Path(path) => loaders::load_path(&path, &options)?,
            Source::Database { url, query } => {
                let query = query.ok_or_else(|| {
                    crate::error::TabcleanError::UnsupportedSource(format!(
                        "'{url}' is not a supported file and no query was given"
                    ))
                })?;
                loaders::load_query(&url, &query)?
            }
        };

        tracing::debug!(
            "Loaded table with {} columns and {} rows",
            df.width(),
            df.height()
        );
        Ok(Self {
            df,
            options,
            load_error: None,
        })
    }

    /// Build a table from named columns.
    ///
    /// A column whose values are all integers becomes an integer column, all
    /// numbers a float column, all booleans a boolean column; any other mix
    /// is stored as text.
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::InvalidTable`](crate::error::TabcleanError::InvalidTable)
    /// if column lengths differ or a name repeats.
    pub fn from_columns<N: Into<String>>(columns: Vec<(N, Vec<Cell>)>) -> Result<Self> {
        let columns = columns
            .into_iter()
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        let df = loaders::frame_from_columns(columns)?;
        Self::try_from_source(df, TableOptions::default())
    }

    /// Replace the options used by loaders and operators.
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Why construction fell back to an empty table, if it did.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The backing frame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Consume the table, returning its frame.
    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// True when the table has no columns or no rows.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Cells of column `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Cell>> {
        let series = self.df.column(name).ok()?.as_materialized_series();
        (0..series.len())
            .map(|i| series.get(i).ok().map(cell_from_any))
            .collect()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<Cell> {
        let series = self.df.column(column).ok()?.as_materialized_series();
        series.get(row).ok().map(cell_from_any)
    }

    /// Row `index` as one cell per column.
    pub fn row(&self, index: usize) -> Option<Vec<Cell>> {
        if index >= self.height() {
            return None;
        }
        self.df
            .get_columns()
            .iter()
            .map(|column| {
                column
                    .as_materialized_series()
                    .get(index)
                    .ok()
                    .map(cell_from_any)
            })
            .collect()
    }

    /// All rows, in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        (0..self.height()).filter_map(move |i| self.row(i))
    }
}

/// Make header names unique: blanks become `Unnamed: <i>` and repeats get a
/// `.1`, `.2`, ... suffix.
pub(crate) fn unique_column_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (index, name) in names.into_iter().enumerate() {
        let base = match name.as_ref().trim() {
            "" => format!("Unnamed: {index}"),
            _ => name.as_ref().to_owned(),
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
