//! Raw delimited-text row reader/writer.
//!
//! [`RowTextCodec`] knows nothing about headers or types: every record in
//! the file, header included, comes back as a `Vec<String>`, and writing
//! puts each row back verbatim. Quoting is only applied where a field
//! would otherwise be ambiguous.

use crate::error::{Result, ResultExt as _};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::path::{Path, PathBuf};

/// One record: an ordered sequence of string fields.
pub type Row = Vec<String>;

/// Reads and writes a delimited text file as a sequence of rows.
#[derive(Debug, Clone)]
pub struct RowTextCodec {
    path: PathBuf,
    delimiter: u8,
}

impl RowTextCodec {
    /// Create a codec for `path` using a comma delimiter.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row of the file, the header row included.
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::Io`](crate::error::TabcleanError::Io) if the
    /// file cannot be opened or read, and a parse error if a record is not
    /// valid delimited text.
    pub fn read(&self) -> Result<Vec<Row>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.with_context(|| {
                format!("Failed to parse row {} of {}", index + 1, self.path.display())
            })?;
            rows.push(record.iter().map(ToOwned::to_owned).collect());
        }

        tracing::debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    /// Write `rows` to the file, truncating any existing content.
    ///
    /// Not atomic: an interrupted write leaves a truncated file behind.
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::Io`](crate::error::TabcleanError::Io) if the
    /// file cannot be created or written.
    pub fn write<R, F>(&self, rows: impl IntoIterator<Item = R>) -> Result<()>
    where
        R: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;

        let mut written = 0_usize;
        for row in rows {
            writer.write_record(row)?;
            written += 1;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;

        tracing::debug!("Wrote {written} rows to {}", self.path.display());
        Ok(())
    }
}
