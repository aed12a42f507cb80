//! Loader and operator settings.
//!
//! [`TableOptions`] is plain data: every field has a default, and a partial
//! JSON document only overrides the fields it names.
//!
//! ```
//! use tabclean::config::TableOptions;
//!
//! let options = TableOptions::from_json(r#"{ "null_text": "", "delimiter": ";" }"#)?;
//! assert_eq!(options.delimiter, ';');
//! assert_eq!(options.infer_schema_length, 10_000);
//! # Ok::<(), tabclean::error::TabcleanError>(())
//! ```

use crate::error::{Result, ResultExt as _, TabcleanError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TableOptions {
    /// Field delimiter for delimited text input and export
    pub delimiter: char,
    /// Rows the CSV reader scans to infer column types
    pub infer_schema_length: usize,
    /// Worksheet read from spreadsheet files (0 = first sheet)
    pub sheet_index: usize,
    /// Text a null cell becomes in `convert_to_string`
    pub null_text: String,
    /// Value assigned by min-max normalization when a column is constant
    pub constant_fill: f64,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            infer_schema_length: 10_000,
            sheet_index: 0,
            null_text: "None".to_owned(),
            constant_fill: 0.0,
        }
    }
}

impl TableOptions {
    /// Parse options from a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::Config`] if the JSON is malformed or a field
    /// fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read options file {}", path.as_ref().display())
        })?;
        Self::from_json(&content)
    }

    /// Serialize options to a pretty JSON string
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The delimiter as the single byte the CSV reader and writer expect.
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::Config`] if the delimiter is not ASCII.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                TabcleanError::Config(format!(
                    "delimiter '{}' must be a single ASCII character",
                    self.delimiter
                ))
            })
    }

    fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if !self.constant_fill.is_finite() {
            return Err(TabcleanError::Config(
                "constant_fill must be a finite number".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TableOptions::default();
        assert_eq!(options.delimiter, ',');
        assert_eq!(options.null_text, "None");
        assert_eq!(options.delimiter_byte().unwrap(), b',');
    }

    #[test]
    fn test_partial_json_keeps_defaults() -> Result<()> {
        let options = TableOptions::from_json(r#"{ "sheet_index": 2 }"#)?;
        assert_eq!(options.sheet_index, 2);
        assert_eq!(options.null_text, "None");
        Ok(())
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let result = TableOptions::from_json(r#"{ "delimiter": "§" }"#);
        assert!(matches!(result, Err(TabcleanError::Config(_))));
    }

    #[test]
    fn test_json_round_trip() -> Result<()> {
        let options = TableOptions {
            null_text: "NULL".to_owned(),
            ..Default::default()
        };
        assert_eq!(TableOptions::from_json(&options.to_json()?)?, options);
        Ok(())
    }
}
