//! Rates, fixed deductions and bracket tables for one tax year.
//!
//! Everything the estimator consumes lives in [`TaxYearConfig`]. The
//! built-in [`TaxYearConfig::reference`] schedule can be replaced by a file
//! loaded at runtime, so a new tax year needs no code change.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Bracket, BracketTable};

/// Errors raised by [`TaxYearConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between 0 and 1, got {value}")]
    InvalidRate { field: &'static str, value: Decimal },

    #[error("{field} must not be negative, got {value}")]
    NegativeDeduction { field: &'static str, value: Decimal },

    #[error("{field} must be positive, got {value}")]
    InvalidRoundingUnit { field: &'static str, value: Decimal },
}

/// Social-insurance premium rates. Each rate is the combined employee and
/// employer rate; the employee pays half.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialInsuranceRates {
    /// Employees' pension insurance (厚生年金).
    pub pension_rate: Decimal,
    /// Health insurance (健康保険).
    pub health_rate: Decimal,
    /// Employment insurance (雇用保険).
    pub unemployment_rate: Decimal,
}

/// Flat deductions every household receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedDeductions {
    pub life_insurance: Decimal,
    pub dependent: Decimal,
    pub basic: Decimal,
}

impl FixedDeductions {
    pub fn total(&self) -> Decimal {
        self.life_insurance + self.dependent + self.basic
    }
}

/// National income tax schedule and its rounding rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxSchedule {
    /// `taxable * rate - subtraction`, with the subtraction stored as a
    /// negative intercept.
    pub brackets: BracketTable,
    /// Reconstruction surtax rate applied to the bracket tax.
    pub surtax_rate: Decimal,
    /// Taxable income is floored to a multiple of this amount.
    pub taxable_unit: Decimal,
    /// Tax plus surtax is floored to a multiple of this amount.
    pub liability_unit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentTax {
    pub rate: Decimal,
}

/// Consumption tax rates and the spending split used to blend them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionTaxRates {
    pub standard_rate: Decimal,
    pub reduced_rate: Decimal,
    /// Share of spending assumed to fall under the reduced rate.
    pub engel_coefficient: Decimal,
}

impl ConsumptionTaxRates {
    /// Weighted average of the reduced and standard rates.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tedori_core::TaxYearConfig;
    ///
    /// let rates = TaxYearConfig::reference().consumption_tax;
    /// assert_eq!(rates.blended_rate(), dec!(0.095));
    /// ```
    pub fn blended_rate(&self) -> Decimal {
        self.engel_coefficient * self.reduced_rate
            + (Decimal::ONE - self.engel_coefficient) * self.standard_rate
    }
}

/// Complete parameter set for one estimator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub social_insurance: SocialInsuranceRates,
    pub deductions: FixedDeductions,
    /// Employment-income deduction (給与所得控除) schedule over gross income.
    pub employment_deduction: BracketTable,
    pub income_tax: IncomeTaxSchedule,
    pub resident_tax: ResidentTax,
    pub consumption_tax: ConsumptionTaxRates,
}

impl Default for TaxYearConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl TaxYearConfig {
    /// The built-in schedule: National Tax Agency brackets for the 2020 tax
    /// year with the flat deductions and premium rates the estimator has
    /// always used.
    pub fn reference() -> Self {
        Self {
            tax_year: 2020,
            social_insurance: SocialInsuranceRates {
                pension_rate: Decimal::new(183, 3),
                health_rate: Decimal::new(987, 4),
                unemployment_rate: Decimal::new(9, 3),
            },
            deductions: FixedDeductions {
                life_insurance: Decimal::from(120_000),
                dependent: Decimal::from(380_000),
                basic: Decimal::from(380_000),
            },
            employment_deduction: BracketTable::from_sorted(vec![
                Bracket::new(
                    Some(Decimal::from(1_625_000)),
                    Decimal::ZERO,
                    Decimal::from(550_000),
                ),
                Bracket::new(
                    Some(Decimal::from(1_800_000)),
                    Decimal::new(4, 1),
                    Decimal::from(-100_000),
                ),
                Bracket::new(
                    Some(Decimal::from(3_600_000)),
                    Decimal::new(3, 1),
                    Decimal::from(80_000),
                ),
                Bracket::new(
                    Some(Decimal::from(6_600_000)),
                    Decimal::new(2, 1),
                    Decimal::from(440_000),
                ),
                Bracket::new(
                    Some(Decimal::from(8_500_000)),
                    Decimal::new(1, 1),
                    Decimal::from(1_100_000),
                ),
                Bracket::new(None, Decimal::ZERO, Decimal::from(1_950_000)),
            ]),
            income_tax: IncomeTaxSchedule {
                brackets: BracketTable::from_sorted(vec![
                    Bracket::new(
                        Some(Decimal::from(1_949_000)),
                        Decimal::new(5, 2),
                        Decimal::ZERO,
                    ),
                    Bracket::new(
                        Some(Decimal::from(3_299_000)),
                        Decimal::new(10, 2),
                        Decimal::from(-97_500),
                    ),
                    Bracket::new(
                        Some(Decimal::from(6_949_000)),
                        Decimal::new(20, 2),
                        Decimal::from(-427_500),
                    ),
                    Bracket::new(
                        Some(Decimal::from(8_999_000)),
                        Decimal::new(23, 2),
                        Decimal::from(-636_000),
                    ),
                    Bracket::new(
                        Some(Decimal::from(17_999_000)),
                        Decimal::new(33, 2),
                        Decimal::from(-1_536_000),
                    ),
                    Bracket::new(
                        Some(Decimal::from(39_999_000)),
                        Decimal::new(40, 2),
                        Decimal::from(-2_796_000),
                    ),
                    Bracket::new(None, Decimal::new(45, 2), Decimal::from(-4_796_000)),
                ]),
                surtax_rate: Decimal::new(21, 3),
                taxable_unit: Decimal::from(1_000),
                liability_unit: Decimal::from(100),
            },
            resident_tax: ResidentTax {
                rate: Decimal::new(10, 2),
            },
            consumption_tax: ConsumptionTaxRates {
                standard_rate: Decimal::new(10, 2),
                reduced_rate: Decimal::new(8, 2),
                engel_coefficient: Decimal::new(25, 2),
            },
        }
    }

    /// Checks every scalar parameter. Bracket tables are validated when
    /// they are built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first rate outside `[0, 1]`,
    /// negative fixed deduction, or non-positive rounding unit.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tedori_core::{ConfigError, TaxYearConfig};
    ///
    /// let mut config = TaxYearConfig::reference();
    /// config.resident_tax.rate = dec!(1.5);
    ///
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigError::InvalidRate { field: "resident_tax.rate", value: dec!(1.5) })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("social_insurance.pension_rate", self.social_insurance.pension_rate),
            ("social_insurance.health_rate", self.social_insurance.health_rate),
            (
                "social_insurance.unemployment_rate",
                self.social_insurance.unemployment_rate,
            ),
            ("income_tax.surtax_rate", self.income_tax.surtax_rate),
            ("resident_tax.rate", self.resident_tax.rate),
            ("consumption_tax.standard_rate", self.consumption_tax.standard_rate),
            ("consumption_tax.reduced_rate", self.consumption_tax.reduced_rate),
            (
                "consumption_tax.engel_coefficient",
                self.consumption_tax.engel_coefficient,
            ),
        ];
        for (field, value) in rates {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(ConfigError::InvalidRate { field, value });
            }
        }

        let deductions = [
            ("deductions.life_insurance", self.deductions.life_insurance),
            ("deductions.dependent", self.deductions.dependent),
            ("deductions.basic", self.deductions.basic),
        ];
        for (field, value) in deductions {
            if value < Decimal::ZERO {
                return Err(ConfigError::NegativeDeduction { field, value });
            }
        }

        let units = [
            ("income_tax.taxable_unit", self.income_tax.taxable_unit),
            ("income_tax.liability_unit", self.income_tax.liability_unit),
        ];
        for (field, value) in units {
            if value <= Decimal::ZERO {
                return Err(ConfigError::InvalidRoundingUnit { field, value });
            }
        }

        Ok(())
    }
}
