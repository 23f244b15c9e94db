use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tedori_core::{Bracket, BracketTable, BracketTableError, TaxYearConfig};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading bracket tables from CSV.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown bracket table: {0}")]
    UnknownTable(String),

    #[error("Bracket table '{0}' has no rows")]
    MissingTable(&'static str),

    #[error("Invalid bracket table '{table}': {source}")]
    InvalidTable {
        table: &'static str,
        #[source]
        source: BracketTableError,
    },
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// The schedules a bracket CSV can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableName {
    /// `employment_deduction`: deduction over gross income.
    EmploymentDeduction,
    /// `income_tax`: tax over taxable income.
    IncomeTax,
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmploymentDeduction => "employment_deduction",
            Self::IncomeTax => "income_tax",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BracketLoaderError> {
        match s {
            "employment_deduction" => Ok(Self::EmploymentDeduction),
            "income_tax" => Ok(Self::IncomeTax),
            _ => Err(BracketLoaderError::UnknownTable(s.to_string())),
        }
    }
}

/// A single record from a bracket CSV file.
///
/// - `table`: `employment_deduction` or `income_tax`
/// - `upper_bound`: inclusive upper bound (empty for the open last bracket)
/// - `slope`: multiplier applied to the amount
/// - `intercept`: added after the multiplication (negative for a subtraction)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub table: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub slope: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub intercept: Decimal,
}

/// Parses a CSV cell as a decimal from its text, so fractional values never
/// go through `f64`.
pub(crate) fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim().parse::<Decimal>().map_err(serde::de::Error::custom)
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Both bracket tables of a tax year, ready to drop into a [`TaxYearConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTables {
    pub employment_deduction: BracketTable,
    pub income_tax: BracketTable,
}

impl BracketTables {
    /// Replaces the bracket tables of `config`, keeping its rates.
    pub fn apply_to(
        self,
        mut config: TaxYearConfig,
    ) -> TaxYearConfig {
        config.employment_deduction = self.employment_deduction;
        config.income_tax.brackets = self.income_tax;
        config
    }
}

/// Loader for bracket tables from CSV files.
///
/// Rows belonging to one table must appear in ascending `upper_bound` order;
/// rows of the two tables may be interleaved.
pub struct BracketLoader;

impl BracketLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed bracket records");
        Ok(records)
    }

    /// Group records into the two validated tables.
    ///
    /// Both tables must be present. Each table is validated by
    /// [`BracketTable::new`].
    pub fn into_tables(records: &[BracketRecord]) -> Result<BracketTables, BracketLoaderError> {
        let mut employment_deduction = Vec::new();
        let mut income_tax = Vec::new();

        for record in records {
            let bracket = Bracket::new(record.upper_bound, record.slope, record.intercept);
            match TableName::parse(&record.table)? {
                TableName::EmploymentDeduction => employment_deduction.push(bracket),
                TableName::IncomeTax => income_tax.push(bracket),
            }
        }

        Ok(BracketTables {
            employment_deduction: Self::build(TableName::EmploymentDeduction, employment_deduction)?,
            income_tax: Self::build(TableName::IncomeTax, income_tax)?,
        })
    }

    /// Parse and group in one step.
    pub fn load<R: Read>(reader: R) -> Result<BracketTables, BracketLoaderError> {
        let records = Self::parse(reader)?;
        Self::into_tables(&records)
    }

    fn build(
        name: TableName,
        brackets: Vec<Bracket>,
    ) -> Result<BracketTable, BracketLoaderError> {
        if brackets.is_empty() {
            return Err(BracketLoaderError::MissingTable(name.as_str()));
        }

        BracketTable::new(brackets).map_err(|source| BracketLoaderError::InvalidTable {
            table: name.as_str(),
            source,
        })
    }
}
