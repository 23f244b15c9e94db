use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a list of brackets does not form a usable table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table has no brackets")]
    Empty,

    /// Only the last bracket may be open-ended.
    #[error("bracket {index} has no upper bound but is not the last bracket")]
    UnboundedInnerBracket { index: usize },

    #[error("bracket {index} upper bound does not increase over the previous bracket")]
    NotIncreasing { index: usize },

    #[error("last bracket must be open-ended")]
    BoundedLastBracket,
}

/// One band of a piecewise-linear schedule: `amount * slope + intercept`
/// for every amount up to and including `upper_bound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Decimal>,
    pub slope: Decimal,
    pub intercept: Decimal,
}

impl Bracket {
    pub fn new(
        upper_bound: Option<Decimal>,
        slope: Decimal,
        intercept: Decimal,
    ) -> Self {
        Self {
            upper_bound,
            slope,
            intercept,
        }
    }

    /// Returns true when `amount` falls at or below this bracket's upper bound.
    pub fn contains(
        &self,
        amount: Decimal,
    ) -> bool {
        self.upper_bound.is_none_or(|upper| amount <= upper)
    }

    pub fn apply(
        &self,
        amount: Decimal,
    ) -> Decimal {
        amount * self.slope + self.intercept
    }
}

/// An ordered, validated sequence of [`Bracket`]s.
///
/// Upper bounds strictly increase and the last bracket is open-ended, so
/// every amount maps to exactly one bracket. Tables can only be built through
/// [`BracketTable::new`] (or deserialization, which goes through it).
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tedori_core::{Bracket, BracketTable};
///
/// let table = BracketTable::new(vec![
///     Bracket::new(Some(dec!(1000)), dec!(0.1), dec!(0)),
///     Bracket::new(None, dec!(0.2), dec!(-100)),
/// ])
/// .unwrap();
///
/// assert_eq!(table.evaluate(dec!(1000)), dec!(100));
/// assert_eq!(table.evaluate(dec!(2000)), dec!(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Validates and wraps `brackets`.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the list is empty, an inner bracket
    /// is open-ended, upper bounds do not strictly increase, or the last
    /// bracket is bounded.
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, BracketTableError> {
        let Some((last, bounded)) = brackets.split_last() else {
            return Err(BracketTableError::Empty);
        };

        let mut previous: Option<Decimal> = None;
        for (index, bracket) in bounded.iter().enumerate() {
            let Some(upper) = bracket.upper_bound else {
                return Err(BracketTableError::UnboundedInnerBracket { index });
            };
            if previous.is_some_and(|p| upper <= p) {
                return Err(BracketTableError::NotIncreasing { index });
            }
            previous = Some(upper);
        }

        if last.upper_bound.is_some() {
            return Err(BracketTableError::BoundedLastBracket);
        }

        Ok(Self { brackets })
    }

    /// Wraps brackets that are known to be valid (the built-in schedules).
    pub(crate) fn from_sorted(brackets: Vec<Bracket>) -> Self {
        debug_assert!(Self::new(brackets.clone()).is_ok());
        Self { brackets }
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Finds the bracket whose range contains `amount`.
    pub fn find(
        &self,
        amount: Decimal,
    ) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.contains(amount))
    }

    /// Evaluates the schedule at `amount`. No rounding is applied.
    pub fn evaluate(
        &self,
        amount: Decimal,
    ) -> Decimal {
        // The open last bracket always matches.
        self.find(amount)
            .map_or(Decimal::ZERO, |bracket| bracket.apply(amount))
    }
}

impl TryFrom<Vec<Bracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<Bracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}
