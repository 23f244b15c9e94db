use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tedori_core::{Estimator, EstimatorInput, TaxYearConfig};
use tedori_data::{BracketLoader, ConfigLoader};
use thiserror::Error;
use tracing::{debug, info};

use crate::utils::parse_amount;

/// Validation messages collected from a rejected form, one per problem.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .0.join("; "))]
pub struct FormErrors(pub Vec<String>);

/// Raw text for the three estimator fields, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct EstimateForm {
    pub income: String,
    pub rent: String,
    pub savings: String,
}

impl EstimateForm {
    pub fn new(
        income: impl Into<String>,
        rent: impl Into<String>,
        savings: impl Into<String>,
    ) -> Self {
        Self {
            income: income.into(),
            rent: rent.into(),
            savings: savings.into(),
        }
    }

    /// Parse every field and check the cross-field rules.
    ///
    /// All field-level problems are reported together; the cross-field
    /// checks run only once every field is a number.
    pub fn validate(&self) -> Result<EstimatorInput, FormErrors> {
        let mut errors = Vec::new();

        let income = Self::parse_field("年収 (income)", &self.income, &mut errors);
        let rent = Self::parse_field("家賃 (rent)", &self.rent, &mut errors);
        let savings = Self::parse_field("貯蓄 (savings)", &self.savings, &mut errors);

        let (Some(income), Some(rent), Some(savings)) = (income, rent, savings) else {
            return Err(FormErrors(errors));
        };

        EstimatorInput::new(income, rent, savings).map_err(|e| FormErrors(vec![e.to_string()]))
    }

    fn parse_field(
        name: &str,
        value: &str,
        errors: &mut Vec<String>,
    ) -> Option<rust_decimal::Decimal> {
        match parse_amount(value) {
            Ok(amount) => Some(amount),
            Err(e) => {
                errors.push(format!("{name}: {e}"));
                None
            }
        }
    }
}

/// Resolve the tax-year config: a TOML file if given, else the built-in
/// reference schedule, then optionally replace its bracket tables from CSV.
pub fn load_config(
    config_path: Option<&Path>,
    brackets_path: Option<&Path>,
) -> Result<TaxYearConfig> {
    let config = match config_path {
        Some(path) => {
            info!("loading tax-year config from {}", path.display());
            ConfigLoader::load_from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => {
            debug!("using built-in reference config");
            TaxYearConfig::reference()
        }
    };

    let Some(path) = brackets_path else {
        return Ok(config);
    };

    info!("loading bracket tables from {}", path.display());
    let file =
        File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let tables = BracketLoader::load(file)
        .with_context(|| format!("Failed to load brackets: {}", path.display()))?;

    Ok(tables.apply_to(config))
}

/// Build an estimator from the optional config and bracket files.
pub fn build_estimator(
    config_path: Option<&Path>,
    brackets_path: Option<&Path>,
) -> Result<Estimator> {
    let config = load_config(config_path, brackets_path)?;
    let tax_year = config.tax_year;
    let estimator = Estimator::new(config).context("Invalid tax-year config")?;

    debug!(tax_year, "estimator ready");
    Ok(estimator)
}
