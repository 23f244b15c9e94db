//! Employment-income deduction (給与所得控除).
//!
//! The deduction is a piecewise-linear function of gross salary read from a
//! [`BracketTable`]. With the reference table:
//!
//! | Gross income        | Deduction                  |
//! |---------------------|----------------------------|
//! | up to 1,625,000     | 550,000 (never above income) |
//! | up to 1,800,000     | income × 40% − 100,000     |
//! | up to 3,600,000     | income × 30% + 80,000      |
//! | up to 6,600,000     | income × 20% + 440,000     |
//! | up to 8,500,000     | income × 10% + 1,100,000   |
//! | above 8,500,000     | 1,950,000                  |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tedori_core::TaxYearConfig;
//! use tedori_core::calculations::EmploymentDeduction;
//!
//! let config = TaxYearConfig::reference();
//! let deduction = EmploymentDeduction::new(&config.employment_deduction);
//!
//! assert_eq!(deduction.calculate(dec!(5000000)), dec!(1440000));
//! assert_eq!(deduction.calculate(dec!(300000)), dec!(300000));
//! ```

use rust_decimal::Decimal;

use crate::BracketTable;

/// Calculator for the employment-income deduction.
#[derive(Debug, Clone)]
pub struct EmploymentDeduction<'a> {
    table: &'a BracketTable,
}

impl<'a> EmploymentDeduction<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    /// Deduction for a gross annual income. No rounding is applied.
    ///
    /// The result never exceeds `income`, which is what caps the flat amount
    /// of the lowest band. `income` is expected to be non-negative.
    pub fn calculate(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.table.evaluate(income).min(income)
    }

    /// Gross income minus the deduction.
    pub fn employment_income(
        &self,
        income: Decimal,
    ) -> Decimal {
        income - self.calculate(income)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::TaxYearConfig;

    fn deduction_at(income: Decimal) -> Decimal {
        let config = TaxYearConfig::reference();
        EmploymentDeduction::new(&config.employment_deduction).calculate(income)
    }

    #[test]
    fn lowest_band_is_flat() {
        assert_eq!(deduction_at(dec!(1000000)), dec!(550000));
    }

    #[test]
    fn lowest_band_is_capped_at_income() {
        assert_eq!(deduction_at(dec!(300000)), dec!(300000));
        assert_eq!(deduction_at(dec!(0)), dec!(0));
    }

    #[test]
    fn threshold_uses_lower_band() {
        let config = TaxYearConfig::reference();
        let table = &config.employment_deduction;

        assert_eq!(table.find(dec!(1625000)), Some(&table.brackets()[0]));
        assert_eq!(table.find(dec!(1625001)), Some(&table.brackets()[1]));
        assert_eq!(deduction_at(dec!(1625000)), dec!(550000));
    }

    #[test]
    fn second_band() {
        // 1,700,000 * 0.4 - 100,000
        assert_eq!(deduction_at(dec!(1700000)), dec!(580000));
    }

    #[test]
    fn third_band() {
        // 3,000,000 * 0.3 + 80,000
        assert_eq!(deduction_at(dec!(3000000)), dec!(980000));
    }

    #[test]
    fn fourth_band() {
        // 5,000,000 * 0.2 + 440,000
        assert_eq!(deduction_at(dec!(5000000)), dec!(1440000));
    }

    #[test]
    fn fifth_band() {
        // 7,000,000 * 0.1 + 1,100,000
        assert_eq!(deduction_at(dec!(7000000)), dec!(1800000));
    }

    #[test]
    fn top_band_is_flat() {
        assert_eq!(deduction_at(dec!(8500001)), dec!(1950000));
        assert_eq!(deduction_at(dec!(20000000)), dec!(1950000));
    }

    #[test]
    fn continuous_at_every_band_boundary() {
        let config = TaxYearConfig::reference();
        let deduction = EmploymentDeduction::new(&config.employment_deduction);

        for bracket in config.employment_deduction.brackets() {
            let Some(upper) = bracket.upper_bound else {
                continue;
            };
            let at = deduction.calculate(upper);
            let above = deduction.calculate(upper + dec!(1));

            // One yen past the boundary moves the deduction by at most the
            // steepest slope (0.4 yen).
            assert!(
                (above - at).abs() <= dec!(0.4),
                "jump at {upper}: {at} -> {above}"
            );
        }
    }

    #[test]
    fn employment_income_subtracts_deduction() {
        let config = TaxYearConfig::reference();
        let deduction = EmploymentDeduction::new(&config.employment_deduction);

        assert_eq!(deduction.employment_income(dec!(5000000)), dec!(3560000));
        assert_eq!(deduction.employment_income(dec!(300000)), dec!(0));
    }
}
