//! Text and CSV rendering of estimates.
//!
//! Values are shown as whole yen with thousands separators, ratios as
//! percentages with two decimals.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use rust_decimal::{Decimal, RoundingStrategy};
use tedori_core::{Bracket, BracketTable, Estimate, TaxYearConfig};

use crate::utils::pad_to_width;

const LABEL_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
}

/// Formats `value` as whole yen: `¥1,236,850`, `-¥145,350`.
///
/// Fractional yen are rounded half away from zero for display only.
pub fn format_yen(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}¥{}", group_thousands(&rounded.abs().trunc().to_string()))
}

/// Formats a ratio as a percentage with two decimals: `0.01996` -> `2.00%`.
pub fn format_percent(ratio: Decimal) -> String {
    let percent = (ratio * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{percent:.2}%")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// The breakdown as an aligned text table.
pub fn render_table(estimate: &Estimate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {} {:>16} {:>9}",
        "group",
        pad_to_width("item", LABEL_WIDTH),
        "amount",
        "ratio"
    );
    for row in estimate.rows() {
        let _ = writeln!(
            out,
            "{:<8} {} {:>16} {:>9}",
            row.group().as_str(),
            pad_to_width(row.label(), LABEL_WIDTH),
            format_yen(row.value),
            format_percent(row.ratio)
        );
    }
    out
}

/// Writes the breakdown rows as CSV with raw (unformatted) values.
///
/// Values are normalized so `195300.00` is written as `195300`.
pub fn write_rows_csv<W: Write>(
    writer: W,
    estimate: &Estimate,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["group", "label", "value", "ratio"])?;
    for row in estimate.rows() {
        let value = row.value.normalize().to_string();
        let ratio = row.ratio.normalize().to_string();
        csv_writer.write_record([row.group().as_str(), row.label(), &value, &ratio])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_estimate<W: Write>(
    mut writer: W,
    estimate: &Estimate,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => write!(writer, "{}", render_table(estimate))?,
        OutputFormat::Csv => write_rows_csv(writer, estimate)?,
    }
    Ok(())
}

/// One summary line per estimate.
pub fn render_batch_table(estimates: &[Estimate]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>9}",
        "income", "rent", "savings", "direct tax", "consumption tax", "total", "ratio"
    );
    for estimate in estimates {
        let income = estimate.input.income();
        let _ = writeln!(
            out,
            "{:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>9}",
            format_yen(income),
            format_yen(estimate.input.rent()),
            format_yen(estimate.input.savings()),
            format_yen(estimate.total_direct_tax),
            format_yen(estimate.consumption_tax),
            format_yen(estimate.grand_total),
            format_percent(estimate.grand_total / income)
        );
    }
    out
}

/// One CSV record per estimate, raw values.
pub fn write_batch_csv<W: Write>(
    writer: W,
    estimates: &[Estimate],
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "income",
        "rent",
        "savings",
        "taxable_income",
        "income_tax",
        "resident_tax",
        "social_insurance",
        "consumption_tax",
        "grand_total",
    ])?;
    for estimate in estimates {
        csv_writer.write_record([
            estimate.input.income().normalize().to_string(),
            estimate.input.rent().normalize().to_string(),
            estimate.input.savings().normalize().to_string(),
            estimate.taxable_income.normalize().to_string(),
            estimate.income_tax.total.normalize().to_string(),
            estimate.resident_tax.normalize().to_string(),
            estimate.social_insurance_deduction.normalize().to_string(),
            estimate.consumption_tax.normalize().to_string(),
            estimate.grand_total.normalize().to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_batch<W: Write>(
    mut writer: W,
    estimates: &[Estimate],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => write!(writer, "{}", render_batch_table(estimates))?,
        OutputFormat::Csv => write_batch_csv(writer, estimates)?,
    }
    Ok(())
}

fn render_bracket(bracket: &Bracket) -> String {
    let bound = bracket
        .upper_bound
        .map(|upper| format!("≤ {}", format_yen(upper)))
        .unwrap_or_else(|| "above".to_string());
    format!(
        "  {:<16} × {:<6} {:>12}",
        bound,
        bracket.slope.normalize(),
        bracket.intercept.normalize()
    )
}

fn render_table_section(
    out: &mut String,
    title: &str,
    table: &BracketTable,
) {
    let _ = writeln!(out, "{title}");
    for bracket in table.brackets() {
        let _ = writeln!(out, "{}", render_bracket(bracket));
    }
}

/// The active rates and bracket tables.
pub fn render_config(config: &TaxYearConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "tax year {}", config.tax_year);
    let _ = writeln!(out);

    let si = &config.social_insurance;
    let _ = writeln!(out, "social insurance (combined rate, employee pays half)");
    let _ = writeln!(out, "  pension       {}", format_percent(si.pension_rate));
    let _ = writeln!(out, "  health        {}", format_percent(si.health_rate));
    let _ = writeln!(out, "  unemployment  {}", format_percent(si.unemployment_rate));
    let _ = writeln!(out);

    let d = &config.deductions;
    let _ = writeln!(out, "fixed deductions");
    let _ = writeln!(out, "  life insurance  {}", format_yen(d.life_insurance));
    let _ = writeln!(out, "  dependent       {}", format_yen(d.dependent));
    let _ = writeln!(out, "  basic           {}", format_yen(d.basic));
    let _ = writeln!(out);

    render_table_section(
        &mut out,
        "employment-income deduction (income × slope + intercept)",
        &config.employment_deduction,
    );
    let _ = writeln!(out);

    let it = &config.income_tax;
    render_table_section(
        &mut out,
        "income tax (taxable × rate + intercept)",
        &it.brackets,
    );
    let _ = writeln!(out, "  surtax          {}", format_percent(it.surtax_rate));
    let _ = writeln!(out, "  taxable unit    {}", format_yen(it.taxable_unit));
    let _ = writeln!(out, "  liability unit  {}", format_yen(it.liability_unit));
    let _ = writeln!(out);

    let ct = &config.consumption_tax;
    let _ = writeln!(out, "resident tax  {}", format_percent(config.resident_tax.rate));
    let _ = writeln!(
        out,
        "consumption tax  standard {} / reduced {} / engel {} -> blended {}",
        format_percent(ct.standard_rate),
        format_percent(ct.reduced_rate),
        ct.engel_coefficient.normalize(),
        format_percent(ct.blended_rate())
    );
    out
}
