//! One loader per [`SourceFormat`].
//!
//! Delimited text goes straight through the polars CSV reader. Spreadsheets,
//! JSON and query results are read cell by cell into [`Column`]s and then
//! assembled into a frame by [`frame_from_columns`]. File handles, database
//! connections and the runtime driving them are all scoped to the loader
//! call and released on every exit path.

use super::source::SourceFormat;
use super::value::{Cell, Value};
use super::{Column, unique_column_names};
use crate::config::TableOptions;
use crate::error::{Result, ResultExt as _, TabcleanError};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

/// Load a file, choosing the loader from its extension.
///
/// # Errors
///
/// Returns [`TabcleanError::UnsupportedSource`] for an unknown extension,
/// [`TabcleanError::InvalidPath`] if the file does not exist, and the
/// loader's error otherwise.
pub fn load_path(path: &Path, options: &TableOptions) -> Result<DataFrame> {
    let format = SourceFormat::from_path(path).ok_or_else(|| {
        TabcleanError::UnsupportedSource(format!(
            "unsupported file format, incorrect path, or invalid database connection: {}",
            path.display()
        ))
    })?;

    if !path.is_file() {
        return Err(TabcleanError::InvalidPath(format!(
            "file '{}' not found",
            path.display()
        )));
    }

    tracing::info!("Loading {} as {format}", path.display());
    match format {
        SourceFormat::DelimitedText => load_csv(path, options),
        SourceFormat::Spreadsheet => load_spreadsheet(path, options),
        SourceFormat::JsonTable => load_json(path),
        SourceFormat::DatabaseQuery | SourceFormat::InMemory => Err(
            TabcleanError::UnsupportedSource(format!("{format} is not a file format")),
        ),
    }
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// First row is the header; column types are inferred by polars.
///
/// # Errors
///
/// Returns an error if the delimiter is not ASCII or polars cannot read
/// the file.
pub fn load_csv(path: &Path, options: &TableOptions) -> Result<DataFrame> {
    let separator = options.delimiter_byte()?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(options.infer_schema_length))
        .map_parse_options(|parse| parse.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context("Failed to open CSV")?
        .finish()
        .context("Failed to read CSV")?;
    Ok(df)
}

// ---------------------------------------------------------------------------
// Cells to frame
// ---------------------------------------------------------------------------

/// Assemble named cell columns into a frame.
///
/// # Errors
///
/// Returns [`TabcleanError::InvalidTable`] if a name repeats or the columns
/// differ in length.
pub fn frame_from_columns(columns: Vec<Column>) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    for column in &columns {
        if !seen.insert(column.name.as_str()) {
            return Err(TabcleanError::InvalidTable(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
    }
    if let Some(first) = columns.first() {
        let height = first.cells.len();
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != height) {
            return Err(TabcleanError::InvalidTable(format!(
                "column '{}' has {} rows, expected {height}",
                bad.name,
                bad.cells.len()
            )));
        }
    } else {
        return Ok(DataFrame::empty());
    }

    let series = columns
        .iter()
        .map(|column| polars::prelude::Column::from(series_from_cells(&column.name, &column.cells)))
        .collect::<Vec<_>>();
    Ok(DataFrame::new(series)?)
}

/// Columns holding only integers become `Int64`, only numbers `Float64`,
/// only booleans `Boolean`; anything else is rendered as `String`.
fn series_from_cells(name: &str, cells: &[Cell]) -> Series {
    let present = || cells.iter().flatten();
    let name: PlSmallStr = name.into();

    if present().all(|v| matches!(v, Value::Int(_))) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Some(Value::Int(v)) => Some(*v),
                _ => None,
            })
            .collect();
        Series::new(name, values)
    } else if present().all(Value::is_numeric) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| c.as_ref().and_then(Value::as_f64))
            .collect();
        Series::new(name, values)
    } else if present().all(|v| matches!(v, Value::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Some(Value::Bool(b)) => Some(*b),
                _ => None,
            })
            .collect();
        Series::new(name, values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| c.as_ref().map(ToString::to_string))
            .collect();
        Series::new(name, values)
    }
}

// ---------------------------------------------------------------------------
// Spreadsheets
// ---------------------------------------------------------------------------

/// First row of the configured worksheet is the header.
///
/// Blank header cells become `Unnamed: <index>` and repeats get a numeric
/// suffix. Empty and error cells are null.
///
/// # Errors
///
/// Returns [`TabcleanError::Spreadsheet`] if the workbook cannot be opened
/// or has no worksheet at `sheet_index`.
pub fn load_spreadsheet(path: &Path, options: &TableOptions) -> Result<DataFrame> {
    use calamine::{Data, Reader as _, open_workbook_auto};

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(options.sheet_index)
        .ok_or_else(|| {
            TabcleanError::Spreadsheet(format!(
                "worksheet {} not found in {}",
                options.sheet_index,
                path.display()
            ))
        })??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let names = unique_column_names(header.iter().map(|cell| match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }));

    let mut columns: Vec<Column> = names
        .into_iter()
        .map(|name| Column::new(name, Vec::new()))
        .collect();
    for row in rows {
        for (index, column) in columns.iter_mut().enumerate() {
            let cell = match row.get(index) {
                None | Some(Data::Empty) => None,
                Some(Data::Int(v)) => Some(Value::Int(*v)),
                Some(Data::Float(v)) => Some(Value::Float(*v)),
                Some(Data::Bool(b)) => Some(Value::Bool(*b)),
                Some(Data::String(s)) => Some(Value::Text(s.clone())),
                Some(Data::Error(e)) => {
                    tracing::debug!("Spreadsheet error cell {e:?} read as null");
                    None
                }
                Some(other) => Some(Value::Text(other.to_string())),
            };
            column.cells.push(cell);
        }
    }
    frame_from_columns(columns)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Accepts an array of records, an object of columns, or one record per line.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read and a parse error if it
/// is not one of the accepted shapes.
pub fn load_json(path: &Path) -> Result<DataFrame> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    frame_from_columns(parse_json_table(&text)?)
}

pub(crate) fn parse_json_table(text: &str) -> Result<Vec<Column>> {
    use serde_json::Value as Json;

    let records: Vec<serde_json::Map<String, Json>> = match serde_json::from_str::<Json>(text) {
        Ok(Json::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Json::Object(map) => Ok(map),
                other => Err(TabcleanError::Parse(format!(
                    "expected an object per record, found {other}"
                ))),
            })
            .collect::<Result<_>>()?,
        Ok(Json::Object(map)) if is_column_object(&map) => return columns_from_json_object(map),
        Ok(Json::Object(map)) => vec![map],
        Ok(other) => {
            return Err(TabcleanError::Parse(format!(
                "expected a JSON array or object, found {other}"
            )));
        }
        // Not a single document: try newline-delimited records
        Err(_) => text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| {
                    TabcleanError::Parse(format!("line {}: {e}", index + 1))
                })
            })
            .collect::<Result<_>>()?,
    };

    let mut names: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    Ok(names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|record| record.get(&name).and_then(cell_from_json))
                .collect();
            Column::new(name, cells)
        })
        .collect())
}

fn is_column_object(map: &serde_json::Map<String, serde_json::Value>) -> bool {
    !map.is_empty() && map.values().all(|v| v.is_array() || v.is_object())
}

/// `{"col": [..]}` or `{"col": {"row": v}}`.
fn columns_from_json_object(map: serde_json::Map<String, serde_json::Value>) -> Result<Vec<Column>> {
    use serde_json::Value as Json;

    let mut row_labels: Vec<String> = Vec::new();
    for value in map.values() {
        if let Json::Object(rows) = value {
            for label in rows.keys() {
                if !row_labels.contains(label) {
                    row_labels.push(label.clone());
                }
            }
        }
    }

    let mut columns = Vec::with_capacity(map.len());
    for (name, value) in map {
        let cells = match value {
            Json::Array(items) => items.iter().map(cell_from_json).collect(),
            Json::Object(rows) => row_labels
                .iter()
                .map(|label| rows.get(label).and_then(cell_from_json))
                .collect(),
            other => {
                return Err(TabcleanError::Parse(format!(
                    "column '{name}' must be an array or object, found {other}"
                )));
            }
        };
        columns.push(Column::new(name, cells));
    }
    Ok(columns)
}

fn cell_from_json(value: &serde_json::Value) -> Cell {
    use serde_json::Value as Json;

    match value {
        Json::Null => None,
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        Json::String(s) => Some(Value::Text(s.clone())),
        nested @ (Json::Array(_) | Json::Object(_)) => Some(Value::Text(nested.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Run `query` against the database at `url` and materialize the result.
///
/// Any driver compiled into sqlx's `Any` backend is accepted (`postgres://`,
/// `sqlite:`). Column names come from the first row, so an empty result set
/// yields an empty table. Safe to call from inside a tokio runtime: the
/// query then runs on a scoped thread with its own runtime.
///
/// # Errors
///
/// Returns [`TabcleanError::Database`] if the connection or the query fails.
pub fn load_query(url: &str, query: &str) -> Result<DataFrame> {
    sqlx::any::install_default_drivers();

    let columns = if tokio::runtime::Handle::try_current().is_ok() {
        // block_on panics on a thread that already drives a runtime
        std::thread::scope(|scope| scope.spawn(|| run_query(url, query)).join()).map_err(
            |_| TabcleanError::Database("database query thread panicked".to_owned()),
        )??
    } else {
        run_query(url, query)?
    };
    frame_from_columns(columns)
}

fn run_query(url: &str, query: &str) -> Result<Vec<Column>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start database runtime")?;

    let rows = runtime.block_on(fetch_rows(url, query)).map_err(|e| {
        TabcleanError::Database(format!("unable to fetch data from the database: {e}"))
    })?;

    tracing::info!("Query returned {} rows", rows.len());
    columns_from_rows(&rows)
}

async fn fetch_rows(url: &str, query: &str) -> Result<Vec<sqlx::any::AnyRow>> {
    use sqlx::Connection as _;

    let mut conn = sqlx::AnyConnection::connect(url)
        .await
        .with_context(|| format!("Failed to connect to {}", redact_url(url)))?;
    let rows = sqlx::query(query)
        .fetch_all(&mut conn)
        .await
        .context("Query failed");
    if let Err(e) = conn.close().await {
        tracing::debug!("Error closing database connection: {e}");
    }
    rows
}

/// Drop credentials from a connection string before it reaches a log line.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            match (url.get(..scheme_end), url.get(at..)) {
                (Some(scheme), Some(host)) => format!("{scheme}://***{host}"),
                _ => url.to_owned(),
            }
        }
        _ => url.to_owned(),
    }
}

fn columns_from_rows(rows: &[sqlx::any::AnyRow]) -> Result<Vec<Column>> {
    use sqlx::{Column as _, Row as _};

    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let names = unique_column_names(first.columns().iter().map(|c| c.name().to_owned()));

    let mut columns: Vec<Column> = names
        .into_iter()
        .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
        .collect();
    for row in rows {
        for (index, column) in columns.iter_mut().enumerate() {
            column.cells.push(cell_from_row(row, index)?);
        }
    }
    Ok(columns)
}

fn cell_from_row(row: &sqlx::any::AnyRow, index: usize) -> Result<Cell> {
    use sqlx::{Row as _, ValueRef as _};

    if row.try_get_raw(index)?.is_null() {
        return Ok(None);
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(Some(Value::Int(v)));
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Ok(Some(Value::Float(v)));
    }
    if let Ok(v) = row.try_get::<bool, _>(index) {
        return Ok(Some(Value::Bool(v)));
    }
    if let Ok(v) = row.try_get::<String, _>(index) {
        return Ok(Some(Value::Text(v)));
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(index) {
        return Ok(Some(Value::Text(String::from_utf8_lossy(&v).into_owned())));
    }
    tracing::debug!("Unreadable database value in column {index} read as null");
    Ok(None)
}
