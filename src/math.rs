use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};

use crate::error::{SortinoResult, SystemError};

/// Decimal places of a reported Sortino ratio.
pub const RATIO_DECIMAL_PLACES: u32 = 4;

/// From 2^53 on every `f64` is an integer, so rounding cannot change it.
const INTEGRAL_F64_THRESHOLD: f64 = 9_007_199_254_740_992.0;

/// Rounds `value` to `dp` decimal places, ties to even.
///
/// Rounding happens on the shortest decimal representation of the `f64`,
/// so `0.00125` rounds to `0.0012` and `0.00135` to `0.0014`.
///
/// Magnitudes of 2^53 and above are already integral and are returned
/// unchanged, including those beyond the `Decimal` range.
///
/// # Errors
/// Returns `SystemError::InvariantViolation` for NaN and infinities.
pub fn round_dp(value: f64, dp: u32) -> SortinoResult<f64> {
    if !value.is_finite() {
        return Err(
            SystemError::InvariantViolation(format!("Cannot round non-finite {value}")).into(),
        );
    }
    if value.abs() >= INTEGRAL_F64_THRESHOLD {
        return Ok(value);
    }

    let dec = Decimal::from_f64(value).ok_or_else(|| {
        SystemError::InvariantViolation(format!("Cannot represent {value} as a decimal"))
    })?;

    // Parsing the decimal text yields the f64 nearest to the rounded value
    dec.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
        .to_string()
        .parse::<f64>()
        .map_err(|e| {
            SystemError::InvariantViolation(format!("Rounded {value} is not an f64: {e}")).into()
        })
}

/// Display-only rounding. Falls back to the raw value when it is not finite.
pub(crate) fn display_dp(value: f64, dp: u32) -> f64 {
    round_dp(value, dp).unwrap_or(value)
}
