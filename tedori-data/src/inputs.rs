//! CSV loader for batches of estimator inputs.
//!
//! ## CSV Format
//!
//! Three required columns, matched by header name (order does not matter):
//!
//! | Column    | Type    | Notes                       |
//! |-----------|---------|-----------------------------|
//! | `income`  | decimal | Annual gross income, ≥ 1    |
//! | `rent`    | decimal | Annual rent, ≥ 0            |
//! | `savings` | decimal | Annual savings, ≥ 0         |
//!
//! Each row must also satisfy `rent + savings ≤ income`.
//!
//! ```csv
//! income,rent,savings
//! 5000000,1000000,500000
//! 3000000,840000,0
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tedori_core::{EstimatorInput, InputError};
use thiserror::Error;

use crate::loader::deserialize_decimal;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(deserialize_with = "deserialize_decimal")]
    income: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    rent: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    savings: Decimal,
}

/// Errors that can occur while loading batch inputs.
#[derive(Debug, Error)]
pub enum InputLoadError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, a missing column, or a non-numeric cell.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based (header = row 0).
    #[error("invalid input on row {row}: {source}")]
    InvalidInput {
        row: usize,
        #[source]
        source: InputError,
    },
}

pub struct InputLoader;

impl InputLoader {
    /// Parse CSV text and validate every row. Rows are returned in file order.
    ///
    /// # Errors
    ///
    /// * [`InputLoadError::Parse`] if the CSV is structurally invalid or a
    ///   field is not a number.
    /// * [`InputLoadError::InvalidInput`] for the first row that fails
    ///   [`EstimatorInput::new`].
    pub fn load_from_str(input: &str) -> Result<Vec<EstimatorInput>, InputLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(input.as_bytes());

        reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(idx, result)| {
                let row = result?;
                EstimatorInput::new(row.income, row.rent, row.savings).map_err(|source| {
                    InputLoadError::InvalidInput {
                        row: idx + 1,
                        source,
                    }
                })
            })
            .collect()
    }

    /// Read a file from disk and delegate to [`InputLoader::load_from_str`].
    pub fn load_from_file(path: &Path) -> Result<Vec<EstimatorInput>, InputLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| InputLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(&contents)
    }
}
