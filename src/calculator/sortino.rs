use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    calculator::{
        asset_return::{AssetPerformance, AssetReturnCalculator},
        downside_risk::downside_risk,
        portfolio_return::portfolio_return,
    },
    data::{
        common::{PriceLookup, RiskMetricsConfig},
        domain::{AssetReturn, Portfolio},
    },
    error::SortinoResult,
    math::{RATIO_DECIMAL_PLACES, display_dp, round_dp},
    source::MarketDataSource,
};

// ================================================================================================
// Sortino Ratio
// ================================================================================================

/// The Sortino ratio of a portfolio.
///
/// ```math
/// S = (R_p - r_f) / DR
/// ```
///
/// When the downside risk `DR` is exactly zero the ratio is unbounded. That
/// case is [`SortinoRatio::Undefined`]; [`SortinoRatio::value`] reports it
/// as the sentinel `0.0`, which is **not** a genuine zero ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SortinoRatio {
    /// Rounded to four decimal places, ties to even.
    Finite(f64),
    /// Downside risk was zero.
    Undefined,
}

impl SortinoRatio {
    /// Reported value of an undefined ratio.
    pub const SENTINEL: f64 = 0.0;

    /// Applies the zero-downside policy, then rounds the ratio.
    ///
    /// # Errors
    /// Returns `SystemError::InvariantViolation` if the ratio is not finite.
    pub fn from_components(
        portfolio_return: f64,
        downside_risk: f64,
        risk_free_rate: f64,
    ) -> SortinoResult<Self> {
        if downside_risk == 0.0 {
            return Ok(SortinoRatio::Undefined);
        }

        let raw = (portfolio_return - risk_free_rate) / downside_risk;
        Ok(SortinoRatio::Finite(round_dp(raw, RATIO_DECIMAL_PLACES)?))
    }

    /// The ratio, or [`Self::SENTINEL`] if undefined.
    pub fn value(&self) -> f64 {
        match self {
            SortinoRatio::Finite(v) => *v,
            SortinoRatio::Undefined => Self::SENTINEL,
        }
    }

    pub fn finite(&self) -> Option<f64> {
        match self {
            SortinoRatio::Finite(v) => Some(*v),
            SortinoRatio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, SortinoRatio::Undefined)
    }
}

/// Every intermediate of one Sortino evaluation.
///
/// `portfolio_return` and `downside_risk` are kept at full precision; only
/// `ratio` is rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortinoOutcome {
    /// Name of the evaluated portfolio.
    pub portfolio: String,
    /// Per-asset breakdown in portfolio order. Empty when evaluated from
    /// raw returns.
    pub assets: Vec<AssetPerformance>,
    pub risk_free_rate: f64,
    pub portfolio_return: f64,
    pub downside_risk: f64,
    pub ratio: SortinoRatio,
}

impl SortinoOutcome {
    /// The reported ratio (`0.0` when undefined).
    pub fn sortino_ratio(&self) -> f64 {
        self.ratio.value()
    }

    pub fn is_undefined(&self) -> bool {
        self.ratio.is_undefined()
    }

    pub fn asset_returns(&self) -> Vec<AssetReturn> {
        self.assets.iter().map(|a| a.total_return).collect()
    }
}

// ================================================================================================
// Calculator
// ================================================================================================

/// Computes Sortino ratios of equal-weighted portfolios against one provider.
///
/// Stateless between calls. The configuration is fixed at construction; use
/// separate calculators for different rates or windows.
///
/// # Examples
///
/// ```
/// # use sortino::prelude::*;
/// let calc = SortinoCalculator::new(
///     InMemorySource::new(),
///     RiskMetricsConfig::default().with_annual_risk_free_rate_bps(500),
/// );
/// let returns = [0.10, -0.05, 0.20].map(AssetReturn);
/// let outcome = calc.evaluate_returns("example", &returns).unwrap();
///
/// assert_eq!(outcome.ratio, SortinoRatio::Finite(1.1547));
/// ```
#[derive(Debug, Clone)]
pub struct SortinoCalculator<S> {
    source: S,
    config: RiskMetricsConfig,
}

impl<S: MarketDataSource> SortinoCalculator<S> {
    pub fn new(source: S, config: RiskMetricsConfig) -> Self {
        if config.price_lookup() == PriceLookup::Exact && config.window().has_weekend_boundary() {
            warn!(
                start = %config.window().start(),
                end = %config.window().end(),
                "Window boundary falls on a weekend; exact price lookups will fail"
            );
        }
        Self { source, config }
    }

    pub fn config(&self) -> &RiskMetricsConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches every asset of `portfolio` and computes its Sortino ratio.
    ///
    /// Any fault (missing price, zero start price, provider failure) aborts
    /// the whole portfolio; no partial outcome is returned.
    #[tracing::instrument(
        skip(self, portfolio),
        fields(portfolio = %portfolio.name(), assets = portfolio.len()),
        err
    )]
    pub fn evaluate(&self, portfolio: &Portfolio) -> SortinoResult<SortinoOutcome> {
        let assets = self.asset_performances(portfolio)?;
        let returns = assets.iter().map(|a| a.total_return).collect::<Vec<_>>();
        self.assemble(portfolio.name(), assets, &returns)
    }

    /// Computes the ratio from already known asset returns; no data is fetched.
    pub fn evaluate_returns(
        &self,
        name: &str,
        returns: &[AssetReturn],
    ) -> SortinoResult<SortinoOutcome> {
        self.assemble(name, Vec::new(), returns)
    }

    /// Evaluates portfolios independently; a failing portfolio never stops
    /// the others.
    pub fn evaluate_batch<'p, I>(&self, portfolios: I) -> BatchEvaluation
    where
        I: IntoIterator<Item = &'p Portfolio>,
    {
        let entries = portfolios
            .into_iter()
            .map(|portfolio| {
                let result = self.evaluate(portfolio);
                if let Err(e) = &result {
                    warn!(portfolio = %portfolio.name(), error = %e, "Portfolio evaluation failed");
                }
                BatchEntry {
                    portfolio: portfolio.clone(),
                    result,
                }
            })
            .collect::<Vec<_>>();

        BatchEvaluation { entries }
    }
}

impl<S: MarketDataSource> SortinoCalculator<S> {
    /// Asset results in ticker order, whether fetched in parallel or not.
    fn asset_performances(&self, portfolio: &Portfolio) -> SortinoResult<Vec<AssetPerformance>> {
        let calc = AssetReturnCalculator::new(&self.source, &self.config);

        if self.config.parallel_fetch() {
            portfolio
                .tickers()
                .par_iter()
                .map(|ticker| calc.compute(ticker))
                .collect()
        } else {
            portfolio
                .tickers()
                .iter()
                .map(|ticker| calc.compute(ticker))
                .collect()
        }
    }

    fn assemble(
        &self,
        name: &str,
        assets: Vec<AssetPerformance>,
        returns: &[AssetReturn],
    ) -> SortinoResult<SortinoOutcome> {
        let portfolio_return = portfolio_return(returns)?;
        let downside_risk = downside_risk(returns)?;
        let risk_free_rate = self.config.risk_free_rate_f64();
        let ratio = SortinoRatio::from_components(portfolio_return, downside_risk, risk_free_rate)?;

        info!(
            portfolio = name,
            risk_free_rate,
            portfolio_return = display_dp(portfolio_return, RATIO_DECIMAL_PLACES),
            downside_risk = display_dp(downside_risk, RATIO_DECIMAL_PLACES),
            "Portfolio statistics"
        );
        match ratio {
            SortinoRatio::Finite(value) => {
                info!(portfolio = name, sortino_ratio = value, "Sortino ratio computed");
            }
            SortinoRatio::Undefined => {
                warn!(
                    portfolio = name,
                    sortino_ratio = SortinoRatio::SENTINEL,
                    "Downside risk is zero, Sortino ratio is infinite"
                );
            }
        }

        Ok(SortinoOutcome {
            portfolio: name.to_string(),
            assets,
            risk_free_rate,
            portfolio_return,
            downside_risk,
            ratio,
        })
    }
}

// ================================================================================================
// Batch Evaluation
// ================================================================================================

/// Result of one portfolio within a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub portfolio: Portfolio,
    pub result: SortinoResult<SortinoOutcome>,
}

/// Results of [`SortinoCalculator::evaluate_batch`], in input order.
#[derive(Debug, Default)]
pub struct BatchEvaluation {
    entries: Vec<BatchEntry>,
}

impl BatchEvaluation {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &SortinoOutcome> {
        self.entries.iter().filter_map(|e| e.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Portfolio, &crate::error::SortinoError)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().err().map(|err| (&e.portfolio, err)))
    }

    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.entries
    }
}
