//! # tabclean - tabular data ingestion and cleaning
//!
//! tabclean loads a table from a delimited text file, a spreadsheet, a JSON
//! document, a database query or memory, applies cleaning operators to it and
//! writes the result back out as delimited text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabclean::table::Table;
//!
//! let mut table = Table::load("measurements.csv", None);
//! table.nullify_defaults(None);
//! table.remove_duplicates();
//! table.remove_null_values();
//! table.remove_outliers_default("x");
//! table.to_text_export("measurements_clean.csv")?;
//! # Ok::<(), tabclean::error::TabcleanError>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`table`]: the in-memory table, its loaders and cleaning operators
//! - [`codec`]: reading and writing delimited text row by row
//! - [`pipeline`]: JSON cleaning recipes, validated and replayed on a table
//! - [`config`]: loader and operator settings
//! - [`error`]: error types and handling utilities
//! - [`logging`]: `tracing` subscriber setup for host applications
//!
//! ## Fail-soft construction
//!
//! Building a table from a source never panics and never returns an error:
//! failures are logged and produce an empty table. Operators that cannot
//! apply (unknown column, non-numeric data) log and leave the table as it
//! was. Only writing, explicit `try_` loading and recipe/options parsing
//! return [`Result`](error::Result).

#![warn(clippy::all, rust_2018_idioms)]

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod table;
