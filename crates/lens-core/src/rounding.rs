use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Round `value` to `dp` decimal places through a [`Decimal`].
///
/// Midpoints go to the even neighbour, so 0.125 becomes 0.12 and 0.135
/// becomes 0.14. Values a `Decimal` cannot hold come back unchanged.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(dp))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
