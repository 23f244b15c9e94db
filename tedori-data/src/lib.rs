//! Loaders for tax-year data and estimator inputs.
//!
//! - [`ConfigLoader`]: a complete [`tedori_core::TaxYearConfig`] from TOML.
//! - [`BracketLoader`]: the two bracket tables from CSV, to override a config.
//! - [`InputLoader`]: batches of validated estimator inputs from CSV.

mod config;
mod inputs;
mod loader;

pub use config::{ConfigLoadError, ConfigLoader};
pub use inputs::{InputLoadError, InputLoader};
pub use loader::{BracketLoader, BracketLoaderError, BracketRecord, BracketTables, TableName};
