use std::fmt;

use crate::{
    calculator::sortino::{SortinoOutcome, SortinoRatio},
    math::{RATIO_DECIMAL_PLACES, display_dp},
};

impl fmt::Display for SortinoRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortinoRatio::Finite(v) => write!(f, "{v}"),
            SortinoRatio::Undefined => {
                write!(f, "infinite (reported as {})", SortinoRatio::SENTINEL)
            }
        }
    }
}

/// Human-readable diagnostic block, one statistic per line.
///
/// ```text
/// Portfolio: GLEN.L,MRW.L,AZN
///   AZN: 54.1 -> 60.25 (+1.4 dividends) = 0.1396
///   Portfolio return: 0.0833
///   Downside risk: 0.0289
///   Risk-free rate: 0.05
///   Sortino ratio: 1.1547
/// ```
impl fmt::Display for SortinoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = RATIO_DECIMAL_PLACES;

        writeln!(f, "Portfolio: {}", self.portfolio)?;
        for asset in &self.assets {
            writeln!(
                f,
                "  {}: {} -> {} (+{} dividends) = {}",
                asset.ticker,
                asset.start_price.0,
                asset.end_price.0,
                display_dp(asset.dividends.0, dp),
                display_dp(asset.total_return.0, dp),
            )?;
        }
        writeln!(
            f,
            "  Portfolio return: {}",
            display_dp(self.portfolio_return, dp)
        )?;
        writeln!(f, "  Downside risk: {}", display_dp(self.downside_risk, dp))?;
        writeln!(f, "  Risk-free rate: {}", self.risk_free_rate)?;
        write!(f, "  Sortino ratio: {}", self.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calculator::sortino::SortinoCalculator,
        data::{common::RiskMetricsConfig, domain::AssetReturn},
        source::memory::InMemorySource,
    };

    fn outcome(returns: &[f64]) -> SortinoOutcome {
        let returns = returns.iter().copied().map(AssetReturn).collect::<Vec<_>>();
        SortinoCalculator::new(InMemorySource::new(), RiskMetricsConfig::default())
            .evaluate_returns("demo", &returns)
            .expect("valid returns")
    }

    #[test]
    fn test_ratio_display() {
        assert_eq!(SortinoRatio::Finite(1.1547).to_string(), "1.1547");
        assert_eq!(
            SortinoRatio::Undefined.to_string(),
            "infinite (reported as 0)"
        );
    }

    #[test]
    fn test_summary_rounds_intermediates() {
        let text = outcome(&[0.10, -0.05, 0.20]).to_string();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(
            lines,
            vec![
                "Portfolio: demo",
                "  Portfolio return: 0.0833",
                "  Downside risk: 0.0289",
                "  Risk-free rate: 0.0502",
                "  Sortino ratio: 1.1478",
            ]
        );
    }

    #[test]
    fn test_summary_flags_undefined_ratio() {
        let text = outcome(&[0.02, 0.0, 0.15]).to_string();
        assert!(text.ends_with("Sortino ratio: infinite (reported as 0)"), "{text}");
        assert!(text.contains("Downside risk: 0\n"), "{text}");
    }
}
