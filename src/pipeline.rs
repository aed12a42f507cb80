//! Replayable cleaning recipes.
//!
//! A [`Recipe`] captures a sequence of table operators as versioned JSON so
//! the same cleaning can be applied to every new extract of a dataset.
//!
//! ```no_run
//! use tabclean::config::TableOptions;
//! use tabclean::pipeline::{Recipe, Step, run_recipe_on_source};
//!
//! let recipe = Recipe::new("orders")
//!     .step(Step::Nullify { values: vec!["N/A".into()], column: None })
//!     .step(Step::RemoveNullValues)
//!     .step(Step::RemoveDuplicates)
//!     .step(Step::Export { path: "clean/orders_{date}.csv".to_owned() });
//!
//! let (_table, report) = run_recipe_on_source(&recipe, "orders.csv", TableOptions::default())?;
//! println!("{}", report.summary());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Recipes are validated against the table before any step runs; see
//! [`validate_recipe`].

pub mod executor;
pub mod spec;
pub mod validation;

pub use executor::{RunReport, run_recipe, run_recipe_on_source};
pub use spec::{RECIPE_VERSION, Recipe, Step};
pub use validation::{ValidationError, validate_recipe};
