//! Recipe validation.
//!
//! Checks a recipe against the columns of the table it will run on, so a
//! typo in a column name is reported up front instead of turning into a
//! silent no-op halfway through the run.

use super::spec::{RECIPE_VERSION, Recipe, Step};
use crate::table::Table;
use std::collections::HashSet;

/// Validation error with helpful context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub step_index: Option<usize>,
    pub message: String,
}

impl ValidationError {
    fn new(step_index: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            step_index,
            message: message.into(),
        }
    }

    fn step(step_index: usize, message: impl Into<String>) -> Self {
        Self::new(Some(step_index), message)
    }

    fn recipe(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(idx) = self.step_index {
            write!(f, "Step {}: {}", idx + 1, self.message)
        } else {
            write!(f, "Recipe: {}", self.message)
        }
    }
}

/// Validate a recipe against the table it will be applied to.
///
/// Returns every problem found; an empty list means the recipe can run.
pub fn validate_recipe(recipe: &Recipe, table: &Table) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if recipe.version != RECIPE_VERSION {
        errors.push(ValidationError::recipe(format!(
            "Unsupported recipe version '{}', expected '{}'",
            recipe.version, RECIPE_VERSION
        )));
    }

    // Operators never add or drop columns, so the set is fixed for the run
    let columns: HashSet<&str> = table.column_names().into_iter().collect();

    for (idx, step) in recipe.steps.iter().enumerate() {
        validate_step(step, idx, &columns, &mut errors);
    }

    errors
}

fn validate_step(
    step: &Step,
    idx: usize,
    columns: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(column) = step.column() {
        if !columns.contains(column) {
            errors.push(ValidationError::step(
                idx,
                format!("{}: column '{column}' not found", step.name()),
            ));
        }
    }

    match step {
        Step::RemoveOutliers {
            lower,
            upper,
            factor,
            ..
        } => {
            for (label, q) in [("lower", lower), ("upper", upper)] {
                if !(0.0..=1.0).contains(q) {
                    errors.push(ValidationError::step(
                        idx,
                        format!("remove_outliers: {label} quantile {q} must be within [0, 1]"),
                    ));
                }
            }
            if lower >= upper {
                errors.push(ValidationError::step(
                    idx,
                    format!("remove_outliers: lower quantile {lower} must be below upper {upper}"),
                ));
            }
            if !factor.is_finite() || *factor < 0.0 {
                errors.push(ValidationError::step(
                    idx,
                    format!("remove_outliers: factor {factor} must be a non-negative number"),
                ));
            }
        }
        Step::Nullify { values, .. } if values.is_empty() => {
            errors.push(ValidationError::step(
                idx,
                "nullify: no sentinel values given",
            ));
        }
        Step::Export { path } if path.trim().is_empty() => {
            errors.push(ValidationError::step(idx, "export: path is empty"));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table() -> Table {
        Table::from_columns(vec![
            ("id", vec![Some(Value::Int(1)), Some(Value::Int(2))]),
            ("x", vec![Some(Value::Float(1.5)), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_recipe() {
        let recipe = Recipe::new("ok")
            .step(Step::RemoveDuplicates)
            .step(Step::ConvertToNumeric {
                column: Some("x".to_owned()),
            })
            .step(Step::Normalize);
        assert!(validate_recipe(&recipe, &table()).is_empty());
    }

    #[test]
    fn test_unknown_column() {
        let recipe = Recipe::new("typo").step(Step::NormalizeColumn {
            column: "y".to_owned(),
        });
        let errors = validate_recipe(&recipe, &table());
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Step 1: normalize_column: column 'y' not found"
        );
    }

    #[test]
    fn test_bad_outlier_parameters() {
        let recipe = Recipe::new("fence").step(Step::RemoveOutliers {
            column: "x".to_owned(),
            lower: 0.9,
            upper: 1.5,
            factor: -1.0,
        });
        let errors = validate_recipe(&recipe, &table());
        // upper out of range, and negative factor
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.step_index == Some(0)));
    }

    #[test]
    fn test_version_and_export_path() {
        let mut recipe = Recipe::new("old").step(Step::Export {
            path: "  ".to_owned(),
        });
        recipe.version = "0.0".to_owned();
        let errors = validate_recipe(&recipe, &table());
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().starts_with("Recipe: Unsupported"));
        assert_eq!(errors[1].to_string(), "Step 1: export: path is empty");
    }
}
