//! Recipe data structures.
//!
//! A recipe is an ordered list of cleaning steps, stored as JSON so the same
//! cleaning can be replayed on every new extract of a dataset.

use crate::table::Value;
use crate::table::cleaning::{
    DEFAULT_IQR_FACTOR, DEFAULT_LOWER_QUANTILE, DEFAULT_NULL_SENTINELS, DEFAULT_UPPER_QUANTILE,
};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current recipe format version
pub const RECIPE_VERSION: &str = "0.1";

/// Root recipe structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Format version for future migrations
    pub version: String,

    /// Human-readable recipe name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ordered sequence of cleaning steps
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Recipe {
    /// Create an empty recipe
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: RECIPE_VERSION.to_owned(),
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// Append a step, builder style
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Load a recipe from a JSON file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not hold a valid recipe.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read recipe file")?;
        Self::from_json(&content)
    }

    /// Parse a recipe from JSON string
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or an unknown step `op`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse recipe JSON")
    }

    /// Save recipe to a JSON file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).context("Failed to write recipe file")
    }

    /// Serialize recipe to JSON string
    ///
    /// # Errors
    ///
    /// Fails if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize recipe")
    }
}

/// Cleaning step (tagged enum), one per table operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Drop repeated rows, keeping the first
    RemoveDuplicates,

    /// Drop rows holding any null
    RemoveNullValues,

    /// Drop rows outside the interquartile fence of a column
    RemoveOutliers {
        column: String,
        #[serde(default = "default_lower")]
        lower: f64,
        #[serde(default = "default_upper")]
        upper: f64,
        #[serde(default = "default_factor")]
        factor: f64,
    },

    /// Parse values as numbers (one column, or all when omitted)
    ConvertToNumeric {
        #[serde(default)]
        column: Option<String>,
    },

    /// Stringify values (one column, or all when omitted)
    ConvertToString {
        #[serde(default)]
        column: Option<String>,
    },

    /// Min-max scale one column
    NormalizeColumn { column: String },

    /// Min-max scale every numeric column
    Normalize,

    /// Replace sentinel values with null
    Nullify {
        #[serde(default = "default_sentinels")]
        values: Vec<Value>,
        #[serde(default)]
        column: Option<String>,
    },

    /// Write the table as delimited text
    Export { path: String },
}

impl Step {
    /// Short operator name, as used in the JSON `op` tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "remove_duplicates",
            Self::RemoveNullValues => "remove_null_values",
            Self::RemoveOutliers { .. } => "remove_outliers",
            Self::ConvertToNumeric { .. } => "convert_to_numeric",
            Self::ConvertToString { .. } => "convert_to_string",
            Self::NormalizeColumn { .. } => "normalize_column",
            Self::Normalize => "normalize",
            Self::Nullify { .. } => "nullify",
            Self::Export { .. } => "export",
        }
    }

    /// Column the step is scoped to, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::RemoveOutliers { column, .. } | Self::NormalizeColumn { column } => Some(column),
            Self::ConvertToNumeric { column }
            | Self::ConvertToString { column }
            | Self::Nullify { column, .. } => column.as_deref(),
            Self::RemoveDuplicates | Self::RemoveNullValues | Self::Normalize | Self::Export { .. } => {
                None
            }
        }
    }
}

fn default_lower() -> f64 {
    DEFAULT_LOWER_QUANTILE
}

fn default_upper() -> f64 {
    DEFAULT_UPPER_QUANTILE
}

fn default_factor() -> f64 {
    DEFAULT_IQR_FACTOR
}

fn default_sentinels() -> Vec<Value> {
    DEFAULT_NULL_SENTINELS.into_iter().map(Value::from).collect()
}
