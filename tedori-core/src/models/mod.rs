mod bracket;
mod estimator_input;
mod result_row;
mod tax_year_config;

pub use bracket::{Bracket, BracketTable, BracketTableError};
pub use estimator_input::{EstimatorInput, InputError};
pub use result_row::{BreakdownItem, ResultRow, RowGroup};
pub use tax_year_config::{
    ConfigError, ConsumptionTaxRates, FixedDeductions, IncomeTaxSchedule, ResidentTax,
    SocialInsuranceRates, TaxYearConfig,
};
