use crate::{
    data::domain::AssetReturn,
    error::{MetricError, SortinoResult},
};

/// Equal-weighted portfolio return: the arithmetic mean of the asset returns.
///
/// # Errors
/// Returns `MetricError::InvalidInput` for an empty slice.
pub fn portfolio_return(returns: &[AssetReturn]) -> SortinoResult<f64> {
    if returns.is_empty() {
        return Err(MetricError::InvalidInput(
            "Portfolio return needs at least one asset return".to_string(),
        )
        .into());
    }

    let total: AssetReturn = returns.iter().sum();
    Ok(total.0 / returns.len() as f64)
}
