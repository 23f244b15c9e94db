//! TOML loader for [`TaxYearConfig`].
//!
//! ## File format
//!
//! Decimal values may be written as strings (`"0.183"`) or integers.
//! An open-ended bracket simply omits `upper_bound`.
//!
//! ```toml
//! tax_year = 2020
//!
//! [social_insurance]
//! pension_rate = "0.183"
//! health_rate = "0.0987"
//! unemployment_rate = "0.009"
//!
//! [deductions]
//! life_insurance = 120000
//! dependent = 380000
//! basic = 380000
//!
//! [[employment_deduction]]
//! upper_bound = 1625000
//! slope = "0"
//! intercept = 550000
//!
//! [[employment_deduction]]
//! slope = "0"
//! intercept = 1950000
//!
//! [income_tax]
//! surtax_rate = "0.021"
//! taxable_unit = 1000
//! liability_unit = 100
//!
//! [[income_tax.brackets]]
//! slope = "0.05"
//! intercept = 0
//!
//! [resident_tax]
//! rate = "0.10"
//!
//! [consumption_tax]
//! standard_rate = "0.10"
//! reduced_rate = "0.08"
//! engel_coefficient = "0.25"
//! ```

use std::path::{Path, PathBuf};

use tedori_core::{ConfigError, TaxYearConfig};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a tax-year file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad TOML syntax, a missing field, or a bracket table that failed
    /// validation.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tax-year config: {0}")]
    Invalid(#[from] ConfigError),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse and validate a tax-year config from TOML text.
    pub fn parse(input: &str) -> Result<TaxYearConfig, ConfigLoadError> {
        let config: TaxYearConfig = toml::from_str(input)?;
        config.validate()?;

        debug!(tax_year = config.tax_year, "loaded tax-year config");
        Ok(config)
    }

    /// Read a file from disk and delegate to [`ConfigLoader::parse`].
    pub fn load_from_file(path: &Path) -> Result<TaxYearConfig, ConfigLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }
}
