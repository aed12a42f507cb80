//! In-place cleaning operators.
//!
//! Operators never return a status. When one cannot apply (unknown column,
//! non-numeric data, bad quantiles) it logs a warning and leaves the table
//! untouched, so a chain of operators always runs to the end. Row and column
//! rewrites are lazy polars plans collected back into the table's frame.

use super::Table;
use super::value::{Value, is_numeric_dtype};
use crate::codec::RowTextCodec;
use crate::error::Result;
use polars::prelude::*;
use std::path::Path;

/// Sentinel strings [`Table::nullify_defaults`] turns into nulls.
pub const DEFAULT_NULL_SENTINELS: [&str; 4] = ["\\N", "", "null", "N/A"];

/// Default interquartile bounds and fence factor for outlier removal.
pub const DEFAULT_LOWER_QUANTILE: f64 = 0.25;
pub const DEFAULT_UPPER_QUANTILE: f64 = 0.75;
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;

/// Open interval of values kept by [`Table::remove_outliers`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierBounds {
    pub lower_quantile: f64,
    pub upper_quantile: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Strictly inside the interval; values equal to a bound are outliers.
    pub fn contains(&self, v: f64) -> bool {
        v > self.lower && v < self.upper
    }
}

impl Table {
    /// Drop rows equal to an earlier row across all columns. The first
    /// occurrence is kept and order is preserved. Nulls compare equal.
    pub fn remove_duplicates(&mut self) {
        self.transform("remove_duplicates", |lf| {
            lf.unique_stable(None, UniqueKeepStrategy::First)
        });
    }

    /// Drop every row with a null in any column.
    pub fn remove_null_values(&mut self) {
        self.transform("remove_null_values", |lf| lf.drop_nulls(None));
    }

    /// Compute the interquartile fence for `column` without changing the table.
    ///
    /// Quantiles are linearly interpolated over the non-null values. Returns
    /// `None` (with a warning) when the column is missing, is not numeric or
    /// holds no numbers, or the quantiles are invalid.
    pub fn outlier_bounds(
        &self,
        column: &str,
        lower: f64,
        upper: f64,
        factor: f64,
    ) -> Option<OutlierBounds> {
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            tracing::warn!(
                "Cannot remove outliers from '{column}': quantiles must satisfy 0 <= lower < upper <= 1 (got {lower}, {upper})"
            );
            return None;
        }
        let Ok(target) = self.df.column(column) else {
            tracing::warn!("Cannot remove outliers: column '{column}' not found");
            return None;
        };
        if !is_numeric_dtype(target.dtype()) {
            tracing::warn!(
                "Cannot remove outliers from '{column}': column is not numeric, convert it first"
            );
            return None;
        }

        let x = col(column).cast(DataType::Float64);
        let quantiles = self
            .df
            .clone()
            .lazy()
            .select([
                x.clone()
                    .quantile(lit(lower), QuantileMethod::Linear)
                    .alias("q_low"),
                x.quantile(lit(upper), QuantileMethod::Linear)
                    .alias("q_high"),
            ])
            .collect();
        let (q_low, q_high) = match quantiles {
            Ok(df) => (first_f64(&df, "q_low"), first_f64(&df, "q_high")),
            Err(e) => {
                tracing::warn!("Cannot remove outliers from '{column}': {e}");
                return None;
            }
        };
        let (Some(q_low), Some(q_high)) = (q_low, q_high) else {
            tracing::warn!("Cannot remove outliers from '{column}': column has no numeric values");
            return None;
        };

        let iqr = q_high - q_low;
        Some(OutlierBounds {
            lower_quantile: q_low,
            upper_quantile: q_high,
            lower: q_low - factor * iqr,
            upper: q_high + factor * iqr,
        })
    }

    /// Keep only rows whose `column` value lies inside the open interval
    /// `(q(lower) - factor * IQR, q(upper) + factor * IQR)`.
    ///
    /// Values exactly on a bound are removed, as are nulls in `column`.
    pub fn remove_outliers(&mut self, column: &str, lower: f64, upper: f64, factor: f64) {
        let Some(bounds) = self.outlier_bounds(column, lower, upper, factor) else {
            return;
        };
        tracing::debug!(
            "Outlier bounds for '{column}': ({}, {})",
            bounds.lower,
            bounds.upper
        );

        let x = col(column).cast(DataType::Float64);
        self.transform("remove_outliers", |lf| {
            lf.filter(
                x.clone()
                    .gt(lit(bounds.lower))
                    .and(x.lt(lit(bounds.upper))),
            )
        });
    }

    /// [`remove_outliers`](Self::remove_outliers) with Q1, Q3 and a 1.5 factor.
    pub fn remove_outliers_default(&mut self, column: &str) {
        self.remove_outliers(
            column,
            DEFAULT_LOWER_QUANTILE,
            DEFAULT_UPPER_QUANTILE,
            DEFAULT_IQR_FACTOR,
        );
    }

    /// Convert values to numbers.
    ///
    /// Text is trimmed and parsed; the column becomes integer when every
    /// parsed value is an integer, float otherwise. Booleans become 0 and 1.
    ///
    /// With a column name the conversion is all-or-nothing: if any value fails
    /// to parse the column is left as it was. Without one every column is
    /// converted and values that fail to parse become null.
    pub fn convert_to_numeric(&mut self, column: Option<&str>) {
        match column {
            Some(name) => {
                let Ok(target) = self.df.column(name) else {
                    tracing::warn!("Could not convert '{name}' to numeric: column not found");
                    return;
                };
                match numeric_series(target.as_materialized_series()) {
                    Ok((_, failed)) if failed > 0 => tracing::warn!(
                        "Could not convert '{name}' to numeric: {failed} values are not numbers"
                    ),
                    Ok((series, _)) => self.replace_column(series),
                    Err(e) => tracing::warn!("Could not convert '{name}' to numeric: {e}"),
                }
            }
            None => {
                let mut coerced = 0_usize;
                let names = self.owned_column_names();
                for name in names {
                    let Ok(target) = self.df.column(&name) else {
                        continue;
                    };
                    let series = target.as_materialized_series();
                    match numeric_series(series) {
                        Ok((converted, failed)) => {
                            coerced += failed;
                            self.replace_column(converted);
                        }
                        Err(e) => {
                            tracing::warn!("convert_to_numeric: '{name}' set to null: {e}");
                            coerced += series.len() - series.null_count();
                            let nulls = Series::full_null(
                                name.as_str().into(),
                                series.len(),
                                &DataType::Float64,
                            );
                            self.replace_column(nulls);
                        }
                    }
                }
                if coerced > 0 {
                    tracing::info!("convert_to_numeric: {coerced} unparseable values set to null");
                }
            }
        }
    }

    /// Stringify every value in `column`, or in every column.
    ///
    /// Nulls become [`TableOptions::null_text`](crate::config::TableOptions::null_text).
    pub fn convert_to_string(&mut self, column: Option<&str>) {
        let null_text = self.options().null_text.clone();
        let stringify = |name: &str| {
            col(name)
                .cast(DataType::String)
                .fill_null(lit(null_text.as_str()))
        };

        let exprs: Vec<Expr> = match column {
            Some(name) if self.has_column(name) => vec![stringify(name)],
            Some(name) => {
                tracing::warn!("Could not convert '{name}' to string: column not found");
                return;
            }
            None => self.column_names().into_iter().map(stringify).collect(),
        };
        self.transform("convert_to_string", |lf| lf.with_columns(exprs));
    }

    /// Min-max scale `column` into `[0, 1]`.
    ///
    /// Does nothing if the column is missing, all null, or not numeric. A
    /// constant column maps every value to
    /// [`TableOptions::constant_fill`](crate::config::TableOptions::constant_fill).
    /// Nulls stay null.
    pub fn normalize_column(&mut self, column: &str) {
        let fill = self.options().constant_fill;
        let Ok(target) = self.df.column(column) else {
            tracing::warn!("Could not normalize '{column}': column not found");
            return;
        };
        if !is_numeric_dtype(target.dtype()) {
            tracing::warn!("Could not normalize '{column}': column is not numeric");
            return;
        }
        let series = target.as_materialized_series();
        let (Ok(Some(min)), Ok(Some(max))) = (series.min::<f64>(), series.max::<f64>()) else {
            return;
        };

        let x = col(column).cast(DataType::Float64);
        let range = max - min;
        let scaled = if range == 0.0 {
            when(x.is_not_null())
                .then(lit(fill))
                .otherwise(lit(NULL).cast(DataType::Float64))
        } else {
            (x - lit(min)) / lit(range)
        };
        self.transform("normalize_column", |lf| {
            lf.with_column(scaled.alias(column))
        });
    }

    /// Min-max scale every numeric column; other columns are skipped.
    pub fn normalize(&mut self) {
        for name in self.owned_column_names() {
            let numeric = self
                .df
                .column(&name)
                .is_ok_and(|c| is_numeric_dtype(c.dtype()));
            if numeric {
                self.normalize_column(&name);
            } else {
                tracing::debug!("normalize: skipping non-numeric column '{name}'");
            }
        }
    }

    /// Replace every cell equal to one of `values` with null, in `column` or
    /// table-wide.
    ///
    /// Matching is exact equality against the column's type: numbers match
    /// numeric columns by value, text matches text columns only.
    pub fn nullify(&mut self, values: &[Value], column: Option<&str>) {
        let targets = match column {
            Some(name) if self.has_column(name) => vec![name.to_owned()],
            Some(name) => {
                tracing::warn!("Could not nullify values in '{name}': column not found");
                return;
            }
            None => self.owned_column_names(),
        };

        let exprs: Vec<Expr> = targets
            .iter()
            .filter_map(|name| {
                let dtype = self.df.column(name).ok()?.dtype().clone();
                let hit = values
                    .iter()
                    .filter(|v| v.matches_dtype(&dtype))
                    .map(|v| col(name.as_str()).eq(v.to_lit()))
                    .reduce(Expr::or)?;
                Some(
                    when(hit)
                        .then(lit(NULL).cast(dtype))
                        .otherwise(col(name.as_str()))
                        .alias(name.as_str()),
                )
            })
            .collect();
        if exprs.is_empty() {
            return;
        }

        let before = self.null_count();
        self.transform("nullify", |lf| lf.with_columns(exprs));
        tracing::debug!("nullify: {} cells set to null", self.null_count().saturating_sub(before));
    }

    /// [`nullify`](Self::nullify) with `\N`, empty string, `null` and `N/A`.
    pub fn nullify_defaults(&mut self, column: Option<&str>) {
        let sentinels: Vec<Value> = DEFAULT_NULL_SENTINELS.into_iter().map(Value::from).collect();
        self.nullify(&sentinels, column);
    }

    /// Write the header row and all data rows as delimited text.
    ///
    /// Nulls are written as empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::Io`](crate::error::TabcleanError::Io) if the
    /// file cannot be created or written.
    pub fn to_text_export(&self, path: impl AsRef<Path>) -> Result<()> {
        let delimiter = self.options().delimiter_byte()?;
        let header: Vec<String> = self.owned_column_names();
        let body = self.rows().map(|row| {
            row.into_iter()
                .map(|cell| cell.as_ref().map(ToString::to_string).unwrap_or_default())
                .collect::<Vec<String>>()
        });

        RowTextCodec::new(path.as_ref())
            .with_delimiter(delimiter)
            .write(std::iter::once(header).chain(body))?;
        tracing::info!(
            "Exported {} rows to {}",
            self.height(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Run `plan` over the frame and keep the result. On failure the table
    /// is left as it was.
    fn transform(&mut self, operator: &str, plan: impl FnOnce(LazyFrame) -> LazyFrame) {
        if self.width() == 0 {
            return;
        }
        let before = self.height();
        match plan(self.df.clone().lazy()).collect() {
            Ok(df) => {
                self.df = df;
                tracing::debug!("{operator}: {before} -> {} rows", self.height());
            }
            Err(e) => tracing::warn!("{operator} failed, table left unchanged: {e}"),
        }
    }

    fn replace_column(&mut self, series: Series) {
        let name = series.name().clone();
        if let Err(e) = self.df.with_column(series) {
            tracing::warn!("Could not replace column '{name}': {e}");
        }
    }

    fn owned_column_names(&self) -> Vec<String> {
        self.column_names().into_iter().map(str::to_owned).collect()
    }

    fn null_count(&self) -> usize {
        self.df.get_columns().iter().map(|c| c.null_count()).sum()
    }
}

fn first_f64(df: &DataFrame, name: &str) -> Option<f64> {
    df.column(name)
        .ok()?
        .as_materialized_series()
        .f64()
        .ok()?
        .get(0)
}

/// Numeric version of `series` and how many non-null values did not convert.
fn numeric_series(series: &Series) -> PolarsResult<(Series, usize)> {
    let dtype = series.dtype();
    if is_numeric_dtype(dtype) {
        return Ok((series.clone(), 0));
    }
    if let DataType::String = dtype {
        return Ok(parse_numbers(series.str()?));
    }

    let target = if let DataType::Boolean = dtype {
        DataType::Int64
    } else {
        DataType::Float64
    };
    let converted = series.cast(&target)?;
    let failed = converted.null_count().saturating_sub(series.null_count());
    Ok((converted, failed))
}

fn parse_numbers(texts: &StringChunked) -> (Series, usize) {
    let name = texts.name().clone();
    let trimmed: Vec<Option<&str>> = texts.into_iter().map(|t| t.map(str::trim)).collect();
    let ints: Vec<Option<i64>> = trimmed
        .iter()
        .map(|t| t.and_then(|t| t.parse().ok()))
        .collect();
    let floats: Vec<Option<f64>> = trimmed
        .iter()
        .map(|t| t.and_then(|t| t.parse().ok()))
        .collect();

    let failed = trimmed
        .iter()
        .zip(&floats)
        .filter(|(t, f)| t.is_some() && f.is_none())
        .count();
    let all_integers = ints.iter().zip(&floats).all(|(i, f)| i.is_some() == f.is_some());
    let series = if all_integers {
        Series::new(name, ints)
    } else {
        Series::new(name, floats)
    };
    (series, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableOptions;
    use crate::error::TabcleanError;
    use crate::table::Cell;

    fn int(v: i64) -> Cell {
        Some(Value::Int(v))
    }

    fn float(v: f64) -> Cell {
        Some(Value::Float(v))
    }

    fn text(s: &str) -> Cell {
        Some(Value::from(s))
    }

    fn table(columns: Vec<(&str, Vec<Cell>)>) -> Table {
        Table::from_columns(columns).unwrap()
    }

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let mut t = table(vec![
            ("a", vec![int(1), int(2), int(1), int(3), int(2)]),
            ("b", vec![text("x"), text("y"), text("x"), text("z"), text("q")]),
        ]);
        t.remove_duplicates();
        assert_eq!(t.column("a").unwrap(), vec![int(1), int(2), int(3), int(2)]);
        assert_eq!(t.column("b").unwrap(), vec![text("x"), text("y"), text("z"), text("q")]);
    }

    #[test]
    fn test_remove_duplicates_treats_nulls_as_equal() {
        let mut t = table(vec![("a", vec![None, None, int(1), float(1.0)])]);
        t.remove_duplicates();
        assert_eq!(t.column("a").unwrap(), vec![None, float(1.0)]);
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let mut t = table(vec![
            ("a", vec![int(1), int(1), int(2), None, None]),
            ("b", vec![text("p"), text("p"), text("p"), None, text("q")]),
        ]);
        t.remove_duplicates();
        let once = t.clone();
        t.remove_duplicates();
        assert_eq!(t, once);
        assert_eq!(t.height(), 4);
    }

    #[test]
    fn test_remove_null_values() {
        let mut t = table(vec![
            ("a", vec![int(1), None, int(3)]),
            ("b", vec![text("x"), text("y"), None]),
        ]);
        t.remove_null_values();
        assert_eq!(t.height(), 1);
        assert_eq!(t.row(0).unwrap(), vec![int(1), text("x")]);
    }

    #[test]
    fn test_operators_on_empty_table_are_noops() {
        let mut t = Table::new();
        t.remove_duplicates();
        t.remove_null_values();
        t.remove_outliers_default("x");
        t.convert_to_numeric(None);
        t.convert_to_string(None);
        t.normalize();
        t.nullify_defaults(None);
        assert_eq!((t.width(), t.height()), (0, 0));
    }

    #[test]
    fn test_remove_outliers_drops_far_values() {
        let mut t = table(vec![(
            "x",
            vec![int(1), int(2), int(3), int(4), int(100)],
        )]);
        // q1 = 2, q3 = 4, iqr = 2 => bounds (-1, 7)
        let bounds = t.outlier_bounds("x", 0.25, 0.75, 1.5).unwrap();
        assert_eq!((bounds.lower, bounds.upper), (-1.0, 7.0));

        t.remove_outliers_default("x");
        assert_eq!(t.column("x").unwrap(), vec![int(1), int(2), int(3), int(4)]);
    }

    #[test]
    fn test_outlier_bounds_interpolate() {
        let t = table(vec![("x", vec![int(10), int(11), int(12), int(14), int(13), int(500)])]);
        // sorted 10 11 12 13 14 500; q(0.25) at position 1.25, q(0.75) at 3.75
        let bounds = t.outlier_bounds("x", 0.25, 0.75, 1.5).unwrap();
        assert_eq!(bounds.lower_quantile, 11.25);
        assert_eq!(bounds.upper_quantile, 13.75);
        assert_eq!((bounds.lower, bounds.upper), (7.5, 17.5));
        assert!(bounds.contains(10.0));
        assert!(!bounds.contains(17.5));
    }

    #[test]
    fn test_remove_outliers_excludes_exact_bounds() {
        // q1 = 2, q3 = 4, factor 0 => open interval (2, 4)
        let mut t = table(vec![
            ("x", vec![int(1), int(2), int(3), int(4), int(5)]),
            ("tag", vec![text("a"), text("b"), text("c"), text("d"), text("e")]),
        ]);
        t.remove_outliers("x", 0.25, 0.75, 0.0);
        assert_eq!(t.column("x").unwrap(), vec![int(3)]);
        assert_eq!(t.column("tag").unwrap(), vec![text("c")]);
    }

    #[test]
    fn test_remove_outliers_no_survivor_on_bound() {
        let values = [3.0, 7.5, 1.0, 9.0, 4.0, 4.0, 12.0, -6.0, 2.5];
        let cells: Vec<Cell> = values.iter().map(|v| float(*v)).collect();
        let fences = [(0.25, 0.75, 1.5), (0.1, 0.9, 0.0), (0.0, 1.0, 0.0), (0.3, 0.6, 0.5)];
        for (lower, upper, factor) in fences {
            let mut t = table(vec![("x", cells.clone())]);
            let bounds = t.outlier_bounds("x", lower, upper, factor).unwrap();
            t.remove_outliers("x", lower, upper, factor);
            for cell in t.column("x").unwrap() {
                let v = cell.as_ref().and_then(Value::as_f64).unwrap();
                assert!(v != bounds.lower && v != bounds.upper, "{v} sits on a bound");
            }
        }
    }

    #[test]
    fn test_remove_outliers_drops_null_rows() {
        let mut t = table(vec![("x", vec![int(1), None, int(2), int(3)])]);
        t.remove_outliers("x", 0.25, 0.75, 1.5);
        assert_eq!(t.column("x").unwrap(), vec![int(1), int(2), int(3)]);
    }

    #[test]
    fn test_remove_outliers_rejects_bad_input() {
        let original = table(vec![
            ("x", vec![int(1), int(50)]),
            ("s", vec![text("a"), text("b")]),
            ("n", vec![None, None]),
        ]);

        let mut t = original.clone();
        t.remove_outliers("s", 0.25, 0.75, 1.5);
        t.remove_outliers("missing", 0.25, 0.75, 1.5);
        t.remove_outliers("n", 0.25, 0.75, 1.5);
        t.remove_outliers("x", 0.75, 0.25, 1.5);
        t.remove_outliers("x", -0.1, 0.5, 1.5);
        assert_eq!(t, original);
    }

    #[test]
    fn test_convert_to_numeric_single_column_all_or_nothing() {
        let mut t = table(vec![
            ("good", vec![text("1"), text(" 2.5 "), None]),
            ("ints", vec![text("7"), text("-3"), None]),
            ("bad", vec![text("1"), text("two"), text("3")]),
        ]);
        t.convert_to_numeric(Some("good"));
        t.convert_to_numeric(Some("ints"));
        t.convert_to_numeric(Some("bad"));
        t.convert_to_numeric(Some("missing"));

        assert_eq!(t.column("good").unwrap(), vec![float(1.0), float(2.5), None]);
        assert_eq!(t.column("ints").unwrap(), vec![int(7), int(-3), None]);
        assert_eq!(t.column("bad").unwrap(), vec![text("1"), text("two"), text("3")]);
    }

    #[test]
    fn test_convert_to_numeric_whole_table_coerces() {
        let mut t = table(vec![
            ("a", vec![text("1"), text("x")]),
            ("b", vec![Some(Value::Bool(true)), Some(Value::Bool(false))]),
            ("c", vec![float(0.5), None]),
        ]);
        t.convert_to_numeric(None);
        assert_eq!(t.column("a").unwrap(), vec![int(1), None]);
        assert_eq!(t.column("b").unwrap(), vec![int(1), int(0)]);
        assert_eq!(t.column("c").unwrap(), vec![float(0.5), None]);
    }

    #[test]
    fn test_convert_to_string() {
        let mut t = table(vec![
            ("a", vec![int(1), None]),
            ("b", vec![float(2.0), float(0.25)]),
            ("c", vec![Some(Value::Bool(false)), None]),
        ]);
        t.convert_to_string(Some("a"));
        assert_eq!(t.column("a").unwrap(), vec![text("1"), text("None")]);
        assert_eq!(t.column("b").unwrap(), vec![float(2.0), float(0.25)]);

        t.convert_to_string(None);
        assert_eq!(t.column("b").unwrap(), vec![text("2.0"), text("0.25")]);
        assert_eq!(t.column("c").unwrap(), vec![text("false"), text("None")]);
    }

    #[test]
    fn test_convert_to_string_uses_configured_null_text() {
        let options = TableOptions {
            null_text: "NULL".to_owned(),
            ..Default::default()
        };
        let mut t = table(vec![("a", vec![None])]).with_options(options);
        t.convert_to_string(None);
        assert_eq!(t.column("a").unwrap(), vec![text("NULL")]);
    }

    #[test]
    fn test_normalize_column() {
        let mut t = table(vec![("x", vec![int(10), int(20), None, int(30)])]);
        t.normalize_column("x");
        assert_eq!(t.column("x").unwrap(), vec![float(0.0), float(0.5), None, float(1.0)]);
    }

    #[test]
    fn test_normalize_constant_column_uses_fill() {
        let mut t = table(vec![("x", vec![int(4), int(4), None])]);
        t.normalize_column("x");
        assert_eq!(t.column("x").unwrap(), vec![float(0.0), float(0.0), None]);

        let options = TableOptions {
            constant_fill: 0.5,
            ..Default::default()
        };
        let mut t = table(vec![("x", vec![float(2.5)])]).with_options(options);
        t.normalize_column("x");
        assert_eq!(t.column("x").unwrap(), vec![float(0.5)]);
    }

    #[test]
    fn test_normalize_column_ignores_missing_and_text() {
        let original = table(vec![("s", vec![text("a"), text("b")])]);
        let mut t = original.clone();
        t.normalize_column("missing");
        t.normalize_column("s");
        assert_eq!(t, original);
    }

    #[test]
    fn test_normalize_skips_non_numeric_columns() {
        let mut t = table(vec![
            ("x", vec![int(0), int(5)]),
            ("s", vec![text("a"), text("b")]),
            ("n", vec![None, None]),
        ]);
        t.normalize();
        assert_eq!(t.column("x").unwrap(), vec![float(0.0), float(1.0)]);
        assert_eq!(t.column("s").unwrap(), vec![text("a"), text("b")]);
        assert_eq!(t.column("n").unwrap(), vec![None, None]);
    }

    #[test]
    fn test_nullify_defaults() {
        let mut t = table(vec![
            ("a", vec![text("\\N"), text(""), text("null"), text("N/A")]),
            ("b", vec![text("NULL"), text(" "), text("n/a"), text("0")]),
        ]);
        t.nullify_defaults(None);
        assert_eq!(t.column("a").unwrap(), vec![None, None, None, None]);
        assert_eq!(t.column("b").unwrap(), vec![text("NULL"), text(" "), text("n/a"), text("0")]);
    }

    #[test]
    fn test_nullify_scoped_to_column() {
        let mut t = table(vec![
            ("a", vec![text("0"), text("N/A"), text("x")]),
            ("b", vec![float(0.0), float(1.5), float(0.0)]),
        ]);
        t.nullify(&[Value::Int(0), Value::from("N/A")], Some("b"));
        assert_eq!(t.column("a").unwrap(), vec![text("0"), text("N/A"), text("x")]);
        assert_eq!(t.column("b").unwrap(), vec![None, float(1.5), None]);

        // text "0" is not the number 0
        t.nullify(&[Value::Int(0)], Some("a"));
        assert_eq!(t.column("a").unwrap(), vec![text("0"), text("N/A"), text("x")]);

        t.nullify(&[Value::from("N/A")], None);
        assert_eq!(t.column("a").unwrap(), vec![text("0"), None, text("x")]);
    }

    #[test]
    fn test_export_writes_header_and_empty_nulls() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.csv");
        let t = table(vec![
            ("id", vec![int(1), int(2)]),
            ("note", vec![text("a,b"), None]),
        ]);
        t.to_text_export(&path)?;
        assert_eq!(std::fs::read_to_string(&path)?, "id,note\n1,\"a,b\"\n2,\n");
        Ok(())
    }

    #[test]
    fn test_export_to_missing_directory_is_an_io_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let t = table(vec![("id", vec![int(1)])]);
        let result = t.to_text_export(dir.path().join("no_such_dir").join("out.csv"));
        assert!(matches!(result, Err(TabcleanError::Io(_))));
        Ok(())
    }
}
