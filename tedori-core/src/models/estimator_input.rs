use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Reasons an input triple is rejected before it reaches the estimator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("income must be at least 1 yen, got {0}")]
    IncomeTooSmall(Decimal),

    #[error("rent must not be negative, got {0}")]
    NegativeRent(Decimal),

    #[error("savings must not be negative, got {0}")]
    NegativeSavings(Decimal),

    #[error("rent and savings ({committed}) exceed income ({income})")]
    ExpensesExceedIncome { income: Decimal, committed: Decimal },

    /// Rent plus savings is past the largest representable amount, so it
    /// exceeds any income as well.
    #[error("rent ({rent}) and savings ({savings}) exceed income ({income})")]
    ExpensesOverflow {
        income: Decimal,
        rent: Decimal,
        savings: Decimal,
    },
}

/// Validated annual household figures, in yen.
///
/// The only way to build one is [`EstimatorInput::new`], so an estimator
/// never sees a zero income (which would make every ratio undefined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimatorInput {
    income: Decimal,
    rent: Decimal,
    savings: Decimal,
}

impl EstimatorInput {
    /// # Errors
    ///
    /// Returns [`InputError`] if income is below 1, rent or savings is
    /// negative, or rent plus savings is more than income.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tedori_core::{EstimatorInput, InputError};
    ///
    /// assert!(EstimatorInput::new(dec!(5000000), dec!(1000000), dec!(500000)).is_ok());
    /// assert_eq!(
    ///     EstimatorInput::new(dec!(0), dec!(0), dec!(0)),
    ///     Err(InputError::IncomeTooSmall(dec!(0)))
    /// );
    /// ```
    pub fn new(
        income: Decimal,
        rent: Decimal,
        savings: Decimal,
    ) -> Result<Self, InputError> {
        if income < Decimal::ONE {
            return Err(InputError::IncomeTooSmall(income));
        }
        if rent < Decimal::ZERO {
            return Err(InputError::NegativeRent(rent));
        }
        if savings < Decimal::ZERO {
            return Err(InputError::NegativeSavings(savings));
        }
        let Some(committed) = rent.checked_add(savings) else {
            return Err(InputError::ExpensesOverflow {
                income,
                rent,
                savings,
            });
        };
        if committed > income {
            return Err(InputError::ExpensesExceedIncome { income, committed });
        }

        Ok(Self {
            income,
            rent,
            savings,
        })
    }

    pub fn income(&self) -> Decimal {
        self.income
    }

    pub fn rent(&self) -> Decimal {
        self.rent
    }

    pub fn savings(&self) -> Decimal {
        self.savings
    }
}
