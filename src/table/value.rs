//! Cell values at the table's boundary.
//!
//! Storage is a polars frame; [`Value`] and [`Cell`] are what callers hand
//! in (`from_columns`, `nullify`, recipes) and get back (`cell`, `row`).

use polars::prelude::{AnyValue, DataType, Expr, lit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single non-null cell value.
///
/// The null marker is not a variant: cells are [`Cell`]s, and `None` is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// One table cell. `None` is the null marker.
pub type Cell = Option<Value>;

impl Value {
    /// Numeric view of the value; only `Int` and `Float` are numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Literal expression for comparisons against a column.
    pub fn to_lit(&self) -> Expr {
        match self {
            Self::Bool(b) => lit(*b),
            Self::Int(v) => lit(*v),
            Self::Float(v) => lit(*v),
            Self::Text(s) => lit(s.as_str()),
        }
    }

    /// Whether the value can equal a cell of a column typed `dtype`.
    ///
    /// Numbers match any numeric column; text only matches text columns.
    pub fn matches_dtype(&self, dtype: &DataType) -> bool {
        match self {
            Self::Bool(_) => matches!(dtype, DataType::Boolean),
            Self::Int(_) | Self::Float(_) => is_numeric_dtype(dtype),
            Self::Text(_) => matches!(dtype, DataType::String),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            // Debug keeps the trailing ".0" on integral floats
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Integer and floating point column types.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Convert one polars value into a cell.
///
/// Integers widen to `Int`, floats to `Float`; any other type is rendered
/// as text.
pub fn cell_from_any(value: AnyValue<'_>) -> Cell {
    let value = match value {
        AnyValue::Null => return None,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::Text(s.to_owned()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        AnyValue::Int8(v) => Value::Int(i64::from(v)),
        AnyValue::Int16(v) => Value::Int(i64::from(v)),
        AnyValue::Int32(v) => Value::Int(i64::from(v)),
        AnyValue::Int64(v) => Value::Int(v),
        AnyValue::UInt8(v) => Value::Int(i64::from(v)),
        AnyValue::UInt16(v) => Value::Int(i64::from(v)),
        AnyValue::UInt32(v) => Value::Int(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        AnyValue::Float32(v) => Value::Float(f64::from(v)),
        AnyValue::Float64(v) => Value::Float(v),
        other => Value::Text(other.to_string()),
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::from("N/A").to_string(), "N/A");
    }

    #[test]
    fn test_matches_dtype() {
        assert!(Value::Int(0).matches_dtype(&DataType::Float64));
        assert!(Value::Float(0.5).matches_dtype(&DataType::Int32));
        assert!(!Value::from("0").matches_dtype(&DataType::Int64));
        assert!(!Value::Int(0).matches_dtype(&DataType::String));
        assert!(Value::Bool(false).matches_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_cell_from_any() {
        assert_eq!(cell_from_any(AnyValue::Null), None);
        assert_eq!(cell_from_any(AnyValue::UInt8(7)), Some(Value::Int(7)));
        assert_eq!(cell_from_any(AnyValue::Float32(0.5)), Some(Value::Float(0.5)));
        assert_eq!(cell_from_any(AnyValue::String("a")), Some(Value::from("a")));
        assert_eq!(
            cell_from_any(AnyValue::UInt64(u64::MAX)),
            Some(Value::Float(u64::MAX as f64))
        );
    }

    #[test]
    fn test_untagged_deserialize() -> serde_json::Result<()> {
        let values: Vec<Value> = serde_json::from_str(r#"[0, 1.5, "N/A", true]"#)?;
        assert_eq!(
            values,
            vec![
                Value::Int(0),
                Value::Float(1.5),
                Value::from("N/A"),
                Value::Bool(true)
            ]
        );
        Ok(())
    }
}
