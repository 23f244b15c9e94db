//! Common rounding and ratio helpers shared by the calculations.
//!
//! Every rounding step in the estimator truncates toward negative infinity;
//! there is no half-up or banker's rounding anywhere in the pipeline.

use rust_decimal::Decimal;

/// Floors `value` to the nearest lower multiple of `unit`.
///
/// `unit` must be positive.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tedori_core::calculations::common::floor_to_unit;
///
/// assert_eq!(floor_to_unit(dec!(1953250), dec!(1000)), dec!(1953000));
/// assert_eq!(floor_to_unit(dec!(99853.8), dec!(100)), dec!(99800));
/// assert_eq!(floor_to_unit(dec!(1000), dec!(1000)), dec!(1000));
/// ```
pub fn floor_to_unit(
    value: Decimal,
    unit: Decimal,
) -> Decimal {
    (value / unit).floor() * unit
}

/// Floors `value` to a whole yen.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tedori_core::calculations::common::floor_yen;
///
/// assert_eq!(floor_yen(dec!(246750.9)), dec!(246750));
/// ```
pub fn floor_yen(value: Decimal) -> Decimal {
    value.floor()
}

/// Share of `income` represented by `value`. `income` must be non-zero.
pub fn ratio(
    value: Decimal,
    income: Decimal,
) -> Decimal {
    value / income
}
