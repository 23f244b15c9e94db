//! National income tax (所得税) and reconstruction surtax.
//!
//! Taxable income is first floored to the schedule's taxable unit (1,000 yen),
//! then the matching bracket's `taxable * rate - subtraction` is applied.
//! The annual liability adds the 2.1% reconstruction surtax and floors the
//! sum to the liability unit (100 yen).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tedori_core::TaxYearConfig;
//! use tedori_core::calculations::IncomeTax;
//!
//! let config = TaxYearConfig::reference();
//! let income_tax = IncomeTax::new(&config.income_tax);
//!
//! let liability = income_tax.liability(dec!(1953000));
//! assert_eq!(liability.base_tax, dec!(97800));
//! assert_eq!(liability.surtax, dec!(2053.8));
//! assert_eq!(liability.total, dec!(99800));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::IncomeTaxSchedule;
use crate::calculations::common::floor_to_unit;

/// Income tax owed for a year, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxLiability {
    /// Tax from the bracket schedule.
    pub base_tax: Decimal,
    /// Reconstruction surtax on `base_tax`, unrounded.
    pub surtax: Decimal,
    /// `base_tax + surtax` floored to the liability unit.
    pub total: Decimal,
}

/// Calculator for the income-tax-due function.
#[derive(Debug, Clone)]
pub struct IncomeTax<'a> {
    schedule: &'a IncomeTaxSchedule,
}

impl<'a> IncomeTax<'a> {
    pub fn new(schedule: &'a IncomeTaxSchedule) -> Self {
        Self { schedule }
    }

    /// Bracket tax on `taxable_income`, before surtax.
    ///
    /// Zero or negative taxable income owes nothing.
    pub fn tax_due(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let taxable = floor_to_unit(taxable_income, self.schedule.taxable_unit);
        if taxable <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        self.schedule.brackets.evaluate(taxable)
    }

    /// Bracket tax plus reconstruction surtax, floored to the liability unit.
    pub fn liability(
        &self,
        taxable_income: Decimal,
    ) -> IncomeTaxLiability {
        let base_tax = self.tax_due(taxable_income);
        let surtax = base_tax * self.schedule.surtax_rate;
        let total = floor_to_unit(base_tax + surtax, self.schedule.liability_unit);

        IncomeTaxLiability {
            base_tax,
            surtax,
            total,
        }
    }
}
