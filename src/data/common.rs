use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    data::window::DateWindow,
    error::{ConfigError, IoError, SortinoResult},
};

// ================================================================================================
// Price Lookup
// ================================================================================================

/// How the boundary prices of the window are picked from a provider series.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Default,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceLookup {
    /// A close must exist on exactly the start and the end date.
    ///
    /// A holiday or weekend boundary is a missing-data error.
    #[default]
    Exact,

    /// Use the first close on or after the boundary date.
    ///
    /// The search never leaves the queried range (`start ..= end + 1 day`),
    /// so the end price may come at most one day late.
    OnOrAfter,
}

// ================================================================================================
// Risk & Performance Metrics Configuration
// ================================================================================================

/// Configuration for a Sortino evaluation.
///
/// Passed explicitly to the calculator; nothing here is process-wide, so
/// evaluations with different rates or windows can run side by side.
///
/// # Numeric Representation
/// - **Rates** are stored in **Basis Points (bps)** (`1 bps = 0.01%`).
///   Negative and fractional basis points are valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetricsConfig {
    /// The annualized risk-free rate in **Basis Points** (bps), pinned to the
    /// end date of the window.
    ///
    /// # Conversions
    /// - `502` bps   = 5.02% (`0.0502`)
    /// - `502.5` bps = 5.025% (`0.05025`)
    /// - `-50` bps   = -0.5% (`-0.005`)
    annual_risk_free_rate_bps: f64,

    /// The measurement period.
    #[serde(default)]
    window: DateWindow,

    /// How boundary prices are located in the provider's series.
    #[serde(default)]
    price_lookup: PriceLookup,

    /// Fetch the assets of a portfolio concurrently.
    #[serde(default = "default_parallel_fetch")]
    parallel_fetch: bool,
}

fn default_parallel_fetch() -> bool {
    true
}

impl Default for RiskMetricsConfig {
    fn default() -> Self {
        Self {
            // 502 bps = 5.02%, the rate on the default window's end date
            annual_risk_free_rate_bps: 502.0,
            window: DateWindow::default(),
            price_lookup: PriceLookup::default(),
            parallel_fetch: default_parallel_fetch(),
        }
    }
}

impl RiskMetricsConfig {
    /// Creates a config for the given window with the default rate.
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            ..Default::default()
        }
    }

    /// Parses a JSON config; missing optional fields take their defaults.
    ///
    /// # Errors
    /// Returns `IoError::Json` for malformed input, including an invalid
    /// window.
    pub fn from_json(json: &str) -> SortinoResult<Self> {
        serde_json::from_str(json).map_err(|e| IoError::Json(e).into())
    }

    /// Set Risk Free Rate in whole basis points.
    ///
    /// # Example
    /// `502` = 5.02%, `-50` = -0.5%.
    pub fn with_annual_risk_free_rate_bps(self, bps: i32) -> Self {
        Self {
            annual_risk_free_rate_bps: f64::from(bps),
            ..self
        }
    }

    /// Sets the rate from a decimal fraction (e.g. `0.0502` or `-0.005`).
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidConfig` if the rate is NaN or infinite.
    pub fn with_annual_risk_free_rate(self, rate: f64) -> SortinoResult<Self> {
        let bps = rate * 10_000.0;
        if !bps.is_finite() {
            return Err(ConfigError::InvalidConfig(format!(
                "risk-free rate {rate} is not a finite number"
            ))
            .into());
        }

        Ok(Self {
            annual_risk_free_rate_bps: bps,
            ..self
        })
    }

    pub fn with_window(self, window: DateWindow) -> Self {
        Self { window, ..self }
    }

    pub fn with_price_lookup(self, price_lookup: PriceLookup) -> Self {
        Self {
            price_lookup,
            ..self
        }
    }

    pub fn with_parallel_fetch(self, parallel_fetch: bool) -> Self {
        Self {
            parallel_fetch,
            ..self
        }
    }

    /// Helper to convert the BPS rate to a normalized `f64` (e.g., `502` -> `0.0502`).
    pub fn risk_free_rate_f64(&self) -> f64 {
        self.annual_risk_free_rate_bps / 10_000.0
    }

    pub fn risk_free_rate_bps(&self) -> f64 {
        self.annual_risk_free_rate_bps
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn price_lookup(&self) -> PriceLookup {
        self.price_lookup
    }

    pub fn parallel_fetch(&self) -> bool {
        self.parallel_fetch
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = RiskMetricsConfig::default();
        assert_eq!(cfg.risk_free_rate_bps(), 502.0);
        assert_eq!(cfg.risk_free_rate_f64(), 0.0502);
        assert_eq!(cfg.price_lookup(), PriceLookup::Exact);
        assert!(cfg.parallel_fetch());
        assert_eq!(*cfg.window(), DateWindow::default());
    }

    #[test]
    fn test_rate_from_fraction() {
        let cfg = RiskMetricsConfig::default()
            .with_annual_risk_free_rate(0.05)
            .expect("0.05 is 500 bps");
        assert_eq!(cfg.risk_free_rate_bps(), 500.0);
        assert_eq!(cfg.risk_free_rate_f64(), 0.05);

        let cfg = RiskMetricsConfig::default()
            .with_annual_risk_free_rate(0.0502)
            .expect("0.0502 is 502 bps");
        assert_eq!(cfg.risk_free_rate_bps(), 502.0);

        assert!(RiskMetricsConfig::default().with_annual_risk_free_rate(f64::NAN).is_err());
        assert!(
            RiskMetricsConfig::default()
                .with_annual_risk_free_rate(f64::INFINITY)
                .is_err()
        );
    }

    #[test]
    fn test_negative_and_sub_basis_point_rates() {
        let negative = RiskMetricsConfig::default()
            .with_annual_risk_free_rate(-0.005)
            .expect("negative rates are valid");
        assert_eq!(negative.risk_free_rate_bps(), -50.0);
        assert_eq!(negative.risk_free_rate_f64(), -0.005);

        let fractional = RiskMetricsConfig::default()
            .with_annual_risk_free_rate(0.05025)
            .expect("fractional bps are valid");
        assert!((fractional.risk_free_rate_bps() - 502.5).abs() < 1e-9);
        assert_eq!(fractional.risk_free_rate_f64(), 0.05025);

        let tiny = RiskMetricsConfig::default()
            .with_annual_risk_free_rate(0.00005)
            .expect("half a basis point");
        assert!((tiny.risk_free_rate_bps() - 0.5).abs() < 1e-12);

        let whole = RiskMetricsConfig::default().with_annual_risk_free_rate_bps(-75);
        assert_eq!(whole.risk_free_rate_f64(), -0.0075);

        let json = RiskMetricsConfig::from_json(r#"{ "annual_risk_free_rate_bps": -50 }"#)
            .expect("negative bps in JSON");
        assert_eq!(json.risk_free_rate_f64(), -0.005);
        let json = RiskMetricsConfig::from_json(r#"{ "annual_risk_free_rate_bps": 502.5 }"#)
            .expect("fractional bps in JSON");
        assert_eq!(json.risk_free_rate_bps(), 502.5);
    }

    #[test]
    fn test_config_from_json_with_defaults() {
        let cfg = RiskMetricsConfig::from_json(
            r#"{
                "annual_risk_free_rate_bps": 150,
                "window": { "start": "2019-01-02", "end": "2019-12-31" },
                "price_lookup": "on_or_after"
            }"#,
        )
        .expect("valid config");

        assert_eq!(cfg.risk_free_rate_bps(), 150.0);
        assert_eq!(
            cfg.window().start(),
            NaiveDate::from_ymd_opt(2019, 1, 2).expect("valid date")
        );
        assert_eq!(cfg.price_lookup(), PriceLookup::OnOrAfter);
        assert!(cfg.parallel_fetch());

        let minimal = RiskMetricsConfig::from_json(r#"{ "annual_risk_free_rate_bps": 502 }"#)
            .expect("window defaults");
        assert_eq!(minimal, RiskMetricsConfig::default());

        let inverted = RiskMetricsConfig::from_json(
            r#"{ "annual_risk_free_rate_bps": 1, "window": { "start": "2020-01-02", "end": "2020-01-01" } }"#,
        );
        assert!(inverted.is_err());
    }
}
