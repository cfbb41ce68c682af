use crate::{
    data::domain::AssetReturn,
    error::{MetricError, SortinoResult},
};

/// Downside risk (semi-deviation) of a set of asset returns.
///
/// ```math
/// DR = \sqrt{\frac{1}{n} \sum_{i=1}^{n} \min(r_i, 0)^2}
/// ```
///
/// # Semantics
/// - The threshold is zero, not the mean and not the risk-free rate.
/// - Only strictly negative returns enter the numerator.
/// - `n` is the number of **all** returns, so every non-negative asset
///   dilutes the risk towards zero. This is not the "count of downside
///   observations" variant found in some textbooks.
///
/// The result is never negative.
///
/// # Errors
/// Returns `MetricError::InvalidInput` for an empty slice.
pub fn downside_risk(returns: &[AssetReturn]) -> SortinoResult<f64> {
    if returns.is_empty() {
        return Err(MetricError::InvalidInput(
            "Downside risk needs at least one asset return".to_string(),
        )
        .into());
    }

    let squared_shortfall: f64 = returns
        .iter()
        .filter(|r| r.is_downside())
        .map(|r| r.0 * r.0)
        // An empty f64 sum is -0.0
        .fold(0.0, |acc, sq| acc + sq);

    Ok((squared_shortfall / returns.len() as f64).sqrt())
}
