//! Discounts

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

use crate::prices::Price;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was negative")]
    PercentConversion,
}

/// Compute `percent`% of `amount`, rounded to the nearest minor unit with
/// midpoints rounded away from zero.
///
/// `percent` is expressed in percent, so `5` means five percent.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] when the percentage is
/// negative or the result does not fit in a `u64`.
pub fn percent_of(percent: Decimal, amount: Price) -> Result<Price, DiscountError> {
    percent_of_minor(percent, *amount).map(Price::new)
}

fn percent_of_minor(percent: Decimal, minor: u64) -> Result<u64, DiscountError> {
    if percent.is_sign_negative() && !percent.is_zero() {
        return Err(DiscountError::PercentConversion);
    }

    let Some(applied) = Decimal::from(minor).checked_mul(percent) else {
        return Err(DiscountError::PercentConversion);
    };

    let Some(applied) = applied.checked_div(Decimal::ONE_HUNDRED) else {
        return Err(DiscountError::PercentConversion);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(rounded) = rounded.to_u64() else {
        return Err(DiscountError::PercentConversion);
    };

    Ok(rounded)
}
