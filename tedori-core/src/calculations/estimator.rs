//! Household tax and social-insurance burden estimator.
//!
//! Turns a validated [`EstimatorInput`] into an [`Estimate`]: every
//! intermediate amount of the pipeline plus the ordered breakdown rows.
//!
//! # Pipeline
//!
//! Each step consumes the floored results of the steps before it, so the
//! order is fixed:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Pension, health and unemployment premiums: `floor(income × rate / 2)` |
//! | 2    | Social-insurance deduction: sum of the employee premiums |
//! | 3    | Employment-income deduction and employment income |
//! | 4    | Total deductions: step 2 + life insurance + dependent + basic |
//! | 5    | Taxable income: `max(0, employment income − deductions)` floored to 1,000 |
//! | 6    | Income tax + 2.1% surtax, floored to 100 |
//! | 7    | Resident tax: taxable income × 10% |
//! | 8    | Total direct tax: steps 6 + 7 + 2 |
//! | 9    | Estimated consumption: income − direct tax − rent − savings |
//! | 10   | Blended consumption-tax rate |
//! | 11   | Consumption excluding tax and the consumption tax inside it |
//! | 12   | Grand total: consumption tax + total direct tax |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tedori_core::{Estimator, EstimatorInput, TaxYearConfig};
//!
//! let estimator = Estimator::new(TaxYearConfig::reference()).unwrap();
//! let input = EstimatorInput::new(dec!(5000000), dec!(1000000), dec!(500000)).unwrap();
//!
//! let estimate = estimator.estimate(&input);
//!
//! assert_eq!(estimate.employment_income_deduction, dec!(1440000));
//! assert_eq!(estimate.taxable_income, dec!(1953000));
//! assert_eq!(estimate.consumption_tax, dec!(215000));
//! assert_eq!(estimate.grand_total, dec!(1236850));
//! assert_eq!(estimate.rows().len(), 11);
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calculations::common::{floor_to_unit, floor_yen, ratio};
use crate::calculations::{EmploymentDeduction, IncomeTax, IncomeTaxLiability};
use crate::{BreakdownItem, ConfigError, EstimatorInput, ResultRow, RowGroup, TaxYearConfig};

/// One party's share of the three social-insurance premiums, in whole yen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialInsurancePremiums {
    pub pension: Decimal,
    pub health: Decimal,
    pub unemployment: Decimal,
}

impl SocialInsurancePremiums {
    pub fn total(&self) -> Decimal {
        self.pension + self.health + self.unemployment
    }
}

/// Result of one estimator run.
///
/// All amounts are yen. Intermediate values are exposed so a renderer can
/// explain the breakdown; [`Estimate::rows`] is the ordered output contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub input: EstimatorInput,

    /// Premiums withheld from salary.
    pub employee_premiums: SocialInsurancePremiums,
    /// Matching premiums paid by the employer. Informational only.
    pub employer_premiums: SocialInsurancePremiums,

    pub social_insurance_deduction: Decimal,
    pub employment_income_deduction: Decimal,
    pub employment_income: Decimal,
    pub total_deductions: Decimal,

    /// Always a multiple of the schedule's taxable unit.
    pub taxable_income: Decimal,
    pub income_tax: IncomeTaxLiability,
    pub resident_tax: Decimal,
    pub total_direct_tax: Decimal,

    /// Spending left after direct taxes, rent and savings, consumption tax
    /// included. Negative when fixed outgoings exceed income.
    pub estimated_consumption: Decimal,
    pub blended_consumption_tax_rate: Decimal,
    pub consumption_excluding_tax: Decimal,
    pub consumption_tax: Decimal,

    pub grand_total: Decimal,

    rows: Vec<ResultRow>,
}

impl Estimate {
    /// Breakdown rows: income, the expense categories, then the total.
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// The rows a chart plots: only the expense group.
    pub fn chart_rows(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows
            .iter()
            .filter(|row| row.group() == RowGroup::Expense)
    }

    pub fn row(
        &self,
        item: BreakdownItem,
    ) -> Option<&ResultRow> {
        self.rows.iter().find(|row| row.item == item)
    }
}

/// The estimator. Holds a validated [`TaxYearConfig`] and nothing else, so
/// repeated calls with the same input return the same [`Estimate`].
#[derive(Debug, Clone)]
pub struct Estimator {
    config: TaxYearConfig,
}

impl Estimator {
    /// Creates an estimator for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a rate, deduction or rounding unit in the
    /// config is out of range.
    pub fn new(config: TaxYearConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TaxYearConfig {
        &self.config
    }

    /// Runs the full pipeline for one input.
    pub fn estimate(
        &self,
        input: &EstimatorInput,
    ) -> Estimate {
        let income = input.income();

        let employee_premiums = self.premiums(income);
        let employer_premiums = employee_premiums.clone();
        let social_insurance_deduction = employee_premiums.total();

        let deduction = EmploymentDeduction::new(&self.config.employment_deduction);
        let employment_income_deduction = deduction.calculate(income);
        let employment_income = deduction.employment_income(income);

        let total_deductions = self.total_deductions(social_insurance_deduction);
        let taxable_income = self.taxable_income(employment_income, total_deductions);

        let income_tax = IncomeTax::new(&self.config.income_tax).liability(taxable_income);
        let resident_tax = self.resident_tax(taxable_income);
        let total_direct_tax = income_tax.total + resident_tax + social_insurance_deduction;

        let estimated_consumption = income - total_direct_tax - input.rent() - input.savings();
        if estimated_consumption < Decimal::ZERO {
            warn!(
                %income,
                %estimated_consumption,
                "direct tax, rent and savings exceed income"
            );
        }

        let blended_consumption_tax_rate = self.config.consumption_tax.blended_rate();
        let consumption_excluding_tax =
            self.consumption_excluding_tax(estimated_consumption, blended_consumption_tax_rate);
        let consumption_tax = estimated_consumption - consumption_excluding_tax;

        let grand_total = consumption_tax + total_direct_tax;

        debug!(
            %income,
            %taxable_income,
            %total_direct_tax,
            %grand_total,
            "estimate complete"
        );

        let estimate = Estimate {
            input: *input,
            employee_premiums,
            employer_premiums,
            social_insurance_deduction,
            employment_income_deduction,
            employment_income,
            total_deductions,
            taxable_income,
            income_tax,
            resident_tax,
            total_direct_tax,
            estimated_consumption,
            blended_consumption_tax_rate,
            consumption_excluding_tax,
            consumption_tax,
            grand_total,
            rows: Vec::new(),
        };
        let rows = BreakdownItem::ORDER
            .iter()
            .map(|&item| Self::row(&estimate, item))
            .collect();

        Estimate { rows, ..estimate }
    }

    /// Employee share of each premium: half the combined rate, floored.
    fn premiums(
        &self,
        income: Decimal,
    ) -> SocialInsurancePremiums {
        let rates = &self.config.social_insurance;
        let half = |rate: Decimal| floor_yen(income * rate / Decimal::TWO);

        SocialInsurancePremiums {
            pension: half(rates.pension_rate),
            health: half(rates.health_rate),
            unemployment: half(rates.unemployment_rate),
        }
    }

    fn total_deductions(
        &self,
        social_insurance_deduction: Decimal,
    ) -> Decimal {
        social_insurance_deduction + self.config.deductions.total()
    }

    fn taxable_income(
        &self,
        employment_income: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        floor_to_unit(
            (employment_income - total_deductions).max(Decimal::ZERO),
            self.config.income_tax.taxable_unit,
        )
    }

    fn resident_tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        taxable_income * self.config.resident_tax.rate
    }

    fn consumption_excluding_tax(
        &self,
        estimated_consumption: Decimal,
        blended_rate: Decimal,
    ) -> Decimal {
        floor_yen(estimated_consumption / (Decimal::ONE + blended_rate))
    }

    fn row(
        estimate: &Estimate,
        item: BreakdownItem,
    ) -> ResultRow {
        let income = estimate.input.income();
        let value = match item {
            BreakdownItem::Income => income,
            BreakdownItem::IncomeTax => estimate.income_tax.total,
            BreakdownItem::ResidentTax => estimate.resident_tax,
            BreakdownItem::Pension => estimate.employee_premiums.pension,
            BreakdownItem::HealthInsurance => estimate.employee_premiums.health,
            BreakdownItem::UnemploymentInsurance => estimate.employee_premiums.unemployment,
            BreakdownItem::ConsumptionTax => estimate.consumption_tax,
            BreakdownItem::Rent => estimate.input.rent(),
            BreakdownItem::Savings => estimate.input.savings(),
            BreakdownItem::Consumption => estimate.consumption_excluding_tax,
            BreakdownItem::GrandTotal => estimate.grand_total,
        };
        let ratio = match item {
            BreakdownItem::Income => Decimal::ONE,
            _ => ratio(value, income),
        };

        ResultRow { item, value, ratio }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;

    fn estimator() -> Estimator {
        Estimator::new(TaxYearConfig::reference()).unwrap()
    }

    fn input(
        income: Decimal,
        rent: Decimal,
        savings: Decimal,
    ) -> EstimatorInput {
        EstimatorInput::new(income, rent, savings).unwrap()
    }

    fn standard_estimate() -> Estimate {
        estimator().estimate(&input(dec!(5000000), dec!(1000000), dec!(500000)))
    }

    /// Log output collected by [`capture_warnings`].
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    /// Routes WARN and above on this thread into a buffer until the guard drops.
    fn capture_warnings() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    // =========================================================================
    // step tests
    // =========================================================================

    #[test]
    fn premiums_are_half_the_combined_rate_floored() {
        let premiums = estimator().premiums(dec!(5000000));

        assert_eq!(premiums.pension, dec!(457500));
        assert_eq!(premiums.health, dec!(246750));
        assert_eq!(premiums.unemployment, dec!(22500));
        assert_eq!(premiums.total(), dec!(726750));
    }

    #[test]
    fn premiums_drop_fractional_yen() {
        // 3,333,333 * 0.0987 / 2 = 164,499.98...
        let premiums = estimator().premiums(dec!(3333333));

        assert_eq!(premiums.health, dec!(164499));
    }

    #[test]
    fn total_deductions_adds_fixed_deductions() {
        assert_eq!(estimator().total_deductions(dec!(726750)), dec!(1606750));
    }

    #[test]
    fn taxable_income_floors_to_thousand() {
        let result = estimator().taxable_income(dec!(3560000), dec!(1606750));

        assert_eq!(result, dec!(1953000));
    }

    #[test]
    fn taxable_income_is_zero_when_deductions_exceed_income() {
        let result = estimator().taxable_income(dec!(450000), dec!(1025350));

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn resident_tax_is_flat_ten_percent() {
        assert_eq!(estimator().resident_tax(dec!(1953000)), dec!(195300));
    }

    #[test]
    fn consumption_excluding_tax_floors() {
        let result = estimator().consumption_excluding_tax(dec!(2478150), dec!(0.095));

        assert_eq!(result, dec!(2263150));
    }

    // =========================================================================
    // estimate (integration) tests
    // =========================================================================

    #[test]
    fn estimate_standard_case() {
        let estimate = standard_estimate();

        assert_eq!(estimate.social_insurance_deduction, dec!(726750));
        assert_eq!(estimate.employment_income_deduction, dec!(1440000));
        assert_eq!(estimate.employment_income, dec!(3560000));
        assert_eq!(estimate.total_deductions, dec!(1606750));
        assert_eq!(estimate.taxable_income, dec!(1953000));
        assert_eq!(estimate.income_tax.base_tax, dec!(97800));
        assert_eq!(estimate.income_tax.total, dec!(99800));
        assert_eq!(estimate.resident_tax, dec!(195300));
        assert_eq!(estimate.total_direct_tax, dec!(1021850));
        assert_eq!(estimate.estimated_consumption, dec!(2478150));
        assert_eq!(estimate.blended_consumption_tax_rate, dec!(0.095));
        assert_eq!(estimate.consumption_excluding_tax, dec!(2263150));
        assert_eq!(estimate.consumption_tax, dec!(215000));
        assert_eq!(estimate.grand_total, dec!(1236850));
    }

    #[test]
    fn estimate_employer_share_matches_employee_share() {
        let estimate = standard_estimate();

        assert_eq!(estimate.employer_premiums, estimate.employee_premiums);
    }

    #[test]
    fn estimate_rows_follow_breakdown_order() {
        let estimate = standard_estimate();
        let items: Vec<_> = estimate.rows().iter().map(|row| row.item).collect();

        assert_eq!(items, BreakdownItem::ORDER.to_vec());
    }

    #[test]
    fn estimate_row_values() {
        let estimate = standard_estimate();
        let values: Vec<_> = estimate.rows().iter().map(|row| row.value).collect();

        assert_eq!(
            values,
            vec![
                dec!(5000000),
                dec!(99800),
                dec!(195300),
                dec!(457500),
                dec!(246750),
                dec!(22500),
                dec!(215000),
                dec!(1000000),
                dec!(500000),
                dec!(2263150),
                dec!(1236850),
            ]
        );
    }

    #[test]
    fn estimate_income_row_ratio_is_one() {
        let estimate = standard_estimate();

        assert_eq!(estimate.rows()[0].ratio, Decimal::ONE);
    }

    #[test]
    fn estimate_ratios_are_value_over_income() {
        let estimate = standard_estimate();

        assert_eq!(
            estimate.row(BreakdownItem::IncomeTax).map(|r| r.ratio),
            Some(dec!(0.01996))
        );
        assert_eq!(
            estimate.row(BreakdownItem::Rent).map(|r| r.ratio),
            Some(dec!(0.2))
        );
    }

    #[test]
    fn estimate_taxes_are_small_share_of_income() {
        let estimate = standard_estimate();
        let income_tax = estimate.row(BreakdownItem::IncomeTax).unwrap();
        let resident_tax = estimate.row(BreakdownItem::ResidentTax).unwrap();

        assert!(income_tax.value >= Decimal::ZERO);
        assert!(resident_tax.value >= Decimal::ZERO);
        assert!(income_tax.ratio + resident_tax.ratio < Decimal::ONE);
    }

    #[test]
    fn chart_rows_are_expense_rows_only() {
        let estimate = standard_estimate();
        let chart: Vec<_> = estimate.chart_rows().collect();

        assert_eq!(chart.len(), 9);
        assert!(chart.iter().all(|row| row.group() == RowGroup::Expense));
    }

    #[test]
    fn expense_rows_sum_to_income() {
        let estimate = standard_estimate();
        let total: Decimal = estimate.chart_rows().map(|row| row.value).sum();

        assert_eq!(total, dec!(5000000));
    }

    #[test]
    fn estimate_low_income_owes_no_income_or_resident_tax() {
        let estimate = estimator().estimate(&input(dec!(1000000), dec!(0), dec!(0)));

        assert_eq!(estimate.social_insurance_deduction, dec!(145350));
        assert_eq!(estimate.employment_income_deduction, dec!(550000));
        assert_eq!(estimate.taxable_income, dec!(0));
        assert_eq!(estimate.income_tax.total, dec!(0));
        assert_eq!(estimate.resident_tax, dec!(0));
        assert_eq!(estimate.estimated_consumption, dec!(854650));
        assert_eq!(estimate.consumption_excluding_tax, dec!(780502));
        assert_eq!(estimate.consumption_tax, dec!(74148));
    }

    #[test]
    fn estimate_negative_consumption_still_completes() {
        // Rent and savings take everything; premiums push consumption below zero.
        let estimate = estimator().estimate(&input(dec!(1000000), dec!(1000000), dec!(0)));

        assert_eq!(estimate.estimated_consumption, dec!(-145350));
        assert!(estimate.consumption_tax <= Decimal::ZERO);
        assert_eq!(estimate.rows().len(), 11);
    }

    #[test]
    fn estimate_negative_consumption_logs_warning() {
        let (logs, _guard) = capture_warnings();

        estimator().estimate(&input(dec!(1000000), dec!(1000000), dec!(0)));

        let output = logs.contents();
        assert!(output.contains("WARN"), "no warning logged: {output:?}");
        assert!(output.contains("direct tax, rent and savings exceed income"));
        assert!(output.contains("estimated_consumption=-145350"));
    }

    #[test]
    fn estimate_positive_consumption_logs_no_warning() {
        let (logs, _guard) = capture_warnings();

        standard_estimate();

        assert_eq!(logs.contents(), "");
    }

    #[test]
    fn estimate_high_income_uses_top_brackets() {
        let estimate = estimator().estimate(&input(dec!(50000000), dec!(0), dec!(0)));

        assert_eq!(estimate.employment_income_deduction, dec!(1950000));
        assert!(estimate.income_tax.base_tax > Decimal::ZERO);
        assert!(estimate.grand_total < dec!(50000000));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = TaxYearConfig::reference();
        config.resident_tax.rate = dec!(2);

        assert!(Estimator::new(config).is_err());
    }

    // =========================================================================
    // property tests
    // =========================================================================

    fn arb_input() -> impl Strategy<Value = EstimatorInput> {
        (1u64..200_000_000, 0u32..=100, 0u32..=100).prop_map(|(income, rent_pct, savings_pct)| {
            let income = Decimal::from(income);
            let rent = floor_yen(income * Decimal::from(rent_pct) / dec!(200));
            let savings = floor_yen(income * Decimal::from(savings_pct) / dec!(200));
            EstimatorInput::new(income, rent, savings).unwrap()
        })
    }

    proptest! {
        #[test]
        fn taxable_income_is_multiple_of_thousand(input in arb_input()) {
            let estimate = estimator().estimate(&input);
            prop_assert_eq!(estimate.taxable_income % dec!(1000), Decimal::ZERO);
            prop_assert!(estimate.taxable_income >= Decimal::ZERO);
        }

        #[test]
        fn income_tax_liability_is_multiple_of_hundred(input in arb_input()) {
            let estimate = estimator().estimate(&input);
            prop_assert_eq!(estimate.income_tax.total % dec!(100), Decimal::ZERO);
        }

        #[test]
        fn premiums_are_whole_yen(input in arb_input()) {
            let premiums = estimator().estimate(&input).employee_premiums;
            prop_assert_eq!(premiums.pension.fract(), Decimal::ZERO);
            prop_assert_eq!(premiums.health.fract(), Decimal::ZERO);
            prop_assert_eq!(premiums.unemployment.fract(), Decimal::ZERO);
        }

        #[test]
        fn estimate_is_idempotent(input in arb_input()) {
            let estimator = estimator();
            prop_assert_eq!(estimator.estimate(&input), estimator.estimate(&input));
        }

        #[test]
        fn spending_rows_and_consumption_sum_to_income_after_direct_tax(input in arb_input()) {
            let estimate = estimator().estimate(&input);
            let spending: Decimal = estimate
                .chart_rows()
                .filter(|row| !row.item.is_direct_tax())
                .map(|row| row.value)
                .sum();
            prop_assert_eq!(spending, input.income() - estimate.total_direct_tax);
        }

        #[test]
        fn income_tax_is_non_decreasing(low in 0u64..60_000_000, step in 0u64..5_000_000) {
            let config = TaxYearConfig::reference();
            let income_tax = IncomeTax::new(&config.income_tax);
            let low = Decimal::from(low);
            let high = low + Decimal::from(step);
            prop_assert!(income_tax.tax_due(high) >= income_tax.tax_due(low));
        }

        #[test]
        fn employment_deduction_never_exceeds_income(income in 0u64..100_000_000) {
            let config = TaxYearConfig::reference();
            let deduction = EmploymentDeduction::new(&config.employment_deduction);
            let income = Decimal::from(income);
            prop_assert!(deduction.calculate(income) <= income);
        }
    }
}
