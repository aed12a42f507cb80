//! Recipe execution engine.
//!
//! Applies recipe steps to a table in order and reports what changed.

use super::spec::{Recipe, Step};
use super::validation::validate_recipe;
use crate::config::TableOptions;
use crate::table::{Source, Table};
use anyhow::{Context as _, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Report generated after recipe execution
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of rows before processing
    pub rows_before: usize,

    /// Number of columns before processing
    pub columns_before: usize,

    /// Number of rows after processing
    pub rows_after: usize,

    /// Number of columns after processing
    pub columns_after: usize,

    /// Number of steps successfully applied
    pub steps_applied: usize,

    /// Warnings generated during execution
    pub warnings: Vec<String>,

    /// Time taken for execution
    pub duration: std::time::Duration,
}

impl RunReport {
    /// Number of rows the recipe dropped
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Create a summary message
    pub fn summary(&self) -> String {
        format!(
            "Recipe completed: {} rows removed ({} → {}), {} columns, {} steps, {} warnings, {:.2}s",
            self.rows_removed(),
            self.rows_before,
            self.rows_after,
            self.columns_after,
            self.steps_applied,
            self.warnings.len(),
            self.duration.as_secs_f64()
        )
    }
}

/// Execute a recipe on a table in place.
///
/// The recipe is validated first and refused as a whole if any step is
/// invalid. A failing export is recorded as a warning and the remaining
/// steps still run.
///
/// # Errors
///
/// Fails if [`validate_recipe`] reports any problem; the table is not
/// touched in that case.
pub fn run_recipe(table: &mut Table, recipe: &Recipe) -> Result<RunReport> {
    let start = std::time::Instant::now();
    let mut warnings = Vec::new();

    let validation_errors = validate_recipe(recipe, table);
    if !validation_errors.is_empty() {
        return Err(anyhow::anyhow!(
            "Recipe validation failed:\n{}",
            validation_errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        ));
    }

    let rows_before = table.height();
    let columns_before = table.width();
    let mut steps_applied = 0;

    for (idx, step) in recipe.steps.iter().enumerate() {
        let rows = table.height();
        match apply_step(step, table) {
            Ok(()) => {
                steps_applied += 1;
                tracing::debug!(
                    "Step {} ({}): {} → {} rows",
                    idx + 1,
                    step.name(),
                    rows,
                    table.height()
                );
            }
            Err(e) => {
                tracing::warn!("Step {} ({}) failed: {e:#}", idx + 1, step.name());
                warnings.push(format!("Step {}: {e:#} (skipped)", idx + 1));
            }
        }
    }

    let report = RunReport {
        rows_before,
        columns_before,
        rows_after: table.height(),
        columns_after: table.width(),
        steps_applied,
        warnings,
        duration: start.elapsed(),
    };
    tracing::info!("{}: {}", recipe.name, report.summary());
    Ok(report)
}

/// Load a table from `source` and run a recipe on it.
///
/// Unlike [`Table::from_source`], a load failure is an error here: running
/// a recipe over a silently empty table would only hide the problem.
///
/// # Errors
///
/// Fails if the source cannot be loaded or the recipe is refused by
/// [`run_recipe`].
pub fn run_recipe_on_source(
    recipe: &Recipe,
    source: impl Into<Source>,
    options: TableOptions,
) -> Result<(Table, RunReport)> {
    let mut table =
        Table::try_from_source(source, options).context("Failed to load input table")?;
    let report = run_recipe(&mut table, recipe)?;
    Ok((table, report))
}

/// Apply a single step
fn apply_step(step: &Step, table: &mut Table) -> Result<()> {
    match step {
        Step::RemoveDuplicates => table.remove_duplicates(),
        Step::RemoveNullValues => table.remove_null_values(),
        Step::RemoveOutliers {
            column,
            lower,
            upper,
            factor,
        } => table.remove_outliers(column, *lower, *upper, *factor),
        Step::ConvertToNumeric { column } => table.convert_to_numeric(column.as_deref()),
        Step::ConvertToString { column } => table.convert_to_string(column.as_deref()),
        Step::NormalizeColumn { column } => table.normalize_column(column),
        Step::Normalize => table.normalize(),
        Step::Nullify { values, column } => table.nullify(values, column.as_deref()),
        Step::Export { path } => export(table, &expand_path_template(path))?,
    }
    Ok(())
}

/// Expand `{date}` in an export path to today's date
fn expand_path_template(template: &str) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    PathBuf::from(template.replace("{date}", &today))
}

fn export(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    table
        .to_text_export(path)
        .with_context(|| format!("Failed to export to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RowTextCodec;
    use crate::table::Value;

    fn sales() -> Table {
        Table::from_columns(vec![
            (
                "region",
                vec![
                    Some(Value::from("north")),
                    Some(Value::from("north")),
                    Some(Value::from("south")),
                    Some(Value::from("N/A")),
                ],
            ),
            (
                "amount",
                vec![
                    Some(Value::from("10")),
                    Some(Value::from("10")),
                    Some(Value::from("30")),
                    Some(Value::from("20")),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_expand_path_template() {
        let path = expand_path_template("out/clean_{date}.csv");
        let today = Local::now().format("%Y-%m-%d").to_string();
        assert_eq!(path, PathBuf::from(format!("out/clean_{today}.csv")));
    }

    #[test]
    fn test_run_recipe() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("nested").join("clean.csv");

        let recipe = Recipe::new("sales")
            .step(Step::Nullify {
                values: vec![Value::from("N/A")],
                column: None,
            })
            .step(Step::RemoveNullValues)
            .step(Step::RemoveDuplicates)
            .step(Step::ConvertToNumeric {
                column: Some("amount".to_owned()),
            })
            .step(Step::NormalizeColumn {
                column: "amount".to_owned(),
            })
            .step(Step::Export {
                path: out.to_string_lossy().into_owned(),
            });

        let mut table = sales();
        let report = run_recipe(&mut table, &recipe)?;

        assert_eq!(report.rows_before, 4);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.rows_removed(), 2);
        assert_eq!(report.steps_applied, 6);
        assert!(report.warnings.is_empty());
        assert_eq!(
            table.column("amount"),
            Some(vec![Some(Value::Float(0.0)), Some(Value::Float(1.0))])
        );

        let rows = RowTextCodec::new(&out).read()?;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["region", "amount"]);
        Ok(())
    }

    #[test]
    fn test_invalid_recipe_leaves_table_untouched() {
        let recipe = Recipe::new("typo")
            .step(Step::RemoveDuplicates)
            .step(Step::NormalizeColumn {
                column: "amont".to_owned(),
            });

        let mut table = sales();
        let err = run_recipe(&mut table, &recipe).unwrap_err();
        assert!(err.to_string().contains("column 'amont' not found"));
        assert_eq!(table.height(), 4);
    }

    #[test]
    fn test_failed_export_is_a_warning() -> Result<()> {
        let dir = tempfile::tempdir()?;
        // A directory cannot be opened as the export file
        let recipe = Recipe::new("export")
            .step(Step::Export {
                path: dir.path().to_string_lossy().into_owned(),
            })
            .step(Step::RemoveDuplicates);

        let mut table = sales();
        let report = run_recipe(&mut table, &recipe)?;
        assert_eq!(report.steps_applied, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Step 1:"));
        assert_eq!(table.height(), 3);
        Ok(())
    }

    #[test]
    fn test_run_recipe_on_missing_source() {
        let recipe = Recipe::new("missing");
        let result = run_recipe_on_source(&recipe, "no/such/file.csv", TableOptions::default());
        assert!(result.is_err());
    }
}
