use std::sync::Arc;

use polars::{
    df,
    frame::DataFrame,
    prelude::{DataType, Field, PlSmallStr, Schema, SchemaRef},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    calculator::sortino::BatchEvaluation,
    error::{SortinoError, SortinoResult},
    report::{
        io::{Report, ReportName, ToSchema},
        polars_ext::polars_to_sortino_error,
    },
};

/// One row per evaluated portfolio, in batch order.
///
/// Faulted portfolios keep their row: every statistic is null and `error`
/// carries the fault message.
#[derive(Debug, Clone)]
pub struct SortinoReport {
    pub df: DataFrame,
}

impl Default for SortinoReport {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&SortinoReport::to_schema());
        Self { df }
    }
}

impl ReportName for SortinoReport {
    fn base_name(&self) -> String {
        "sortino_report".to_string()
    }
}

impl Report for SortinoReport {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for SortinoReport {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = SortinoReportCol::iter()
            .map(|col| {
                let dtype = match col {
                    SortinoReportCol::Portfolio
                    | SortinoReportCol::Tickers
                    | SortinoReportCol::Error => DataType::String,

                    SortinoReportCol::AssetCount => DataType::UInt32,

                    SortinoReportCol::RiskFreeRate
                    | SortinoReportCol::PortfolioReturn
                    | SortinoReportCol::DownsideRisk
                    | SortinoReportCol::SortinoRatio => DataType::Float64,

                    SortinoReportCol::RatioUndefined => DataType::Boolean,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TryFrom<&BatchEvaluation> for SortinoReport {
    type Error = SortinoError;

    fn try_from(batch: &BatchEvaluation) -> SortinoResult<Self> {
        if batch.is_empty() {
            return Ok(Self::default());
        }

        let mut rows = SortinoReportSoA::with_capacity(batch.len());
        for entry in batch.entries() {
            rows.portfolio.push(entry.portfolio.name().to_string());
            rows.tickers.push(
                entry
                    .portfolio
                    .tickers()
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            );
            rows.asset_count.push(entry.portfolio.len() as u32);

            match &entry.result {
                Ok(outcome) => {
                    rows.risk_free_rate.push(Some(outcome.risk_free_rate));
                    rows.portfolio_return.push(Some(outcome.portfolio_return));
                    rows.downside_risk.push(Some(outcome.downside_risk));
                    rows.sortino_ratio.push(Some(outcome.sortino_ratio()));
                    rows.ratio_undefined.push(Some(outcome.is_undefined()));
                    rows.error.push(None);
                }
                Err(e) => {
                    rows.risk_free_rate.push(None);
                    rows.portfolio_return.push(None);
                    rows.downside_risk.push(None);
                    rows.sortino_ratio.push(None);
                    rows.ratio_undefined.push(None);
                    rows.error.push(Some(e.to_string()));
                }
            }
        }

        Ok(Self {
            df: DataFrame::try_from(rows)?,
        })
    }
}

#[derive(Default)]
struct SortinoReportSoA {
    portfolio: Vec<String>,
    tickers: Vec<String>,
    asset_count: Vec<u32>,
    risk_free_rate: Vec<Option<f64>>,
    portfolio_return: Vec<Option<f64>>,
    downside_risk: Vec<Option<f64>>,
    sortino_ratio: Vec<Option<f64>>,
    ratio_undefined: Vec<Option<bool>>,
    error: Vec<Option<String>>,
}

impl SortinoReportSoA {
    fn with_capacity(n: usize) -> Self {
        Self {
            portfolio: Vec::with_capacity(n),
            tickers: Vec::with_capacity(n),
            asset_count: Vec::with_capacity(n),
            risk_free_rate: Vec::with_capacity(n),
            portfolio_return: Vec::with_capacity(n),
            downside_risk: Vec::with_capacity(n),
            sortino_ratio: Vec::with_capacity(n),
            ratio_undefined: Vec::with_capacity(n),
            error: Vec::with_capacity(n),
        }
    }
}

impl TryFrom<SortinoReportSoA> for DataFrame {
    type Error = SortinoError;

    fn try_from(value: SortinoReportSoA) -> Result<Self, Self::Error> {
        df!(
            SortinoReportCol::Portfolio.to_string() => value.portfolio,
            SortinoReportCol::Tickers.to_string() => value.tickers,
            SortinoReportCol::AssetCount.to_string() => value.asset_count,
            SortinoReportCol::RiskFreeRate.to_string() => value.risk_free_rate,
            SortinoReportCol::PortfolioReturn.to_string() => value.portfolio_return,
            SortinoReportCol::DownsideRisk.to_string() => value.downside_risk,
            SortinoReportCol::SortinoRatio.to_string() => value.sortino_ratio,
            SortinoReportCol::RatioUndefined.to_string() => value.ratio_undefined,
            SortinoReportCol::Error.to_string() => value.error,
        )
        .map_err(|e| polars_to_sortino_error("sortino report", e))
    }
}

/// Columns of [`SortinoReport`], in output order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    PartialOrd,
    Ord,
    EnumIter,
    IntoStaticStr,
    EnumCount,
)]
#[strum(serialize_all = "snake_case")]
pub enum SortinoReportCol {
    /// Portfolio name.
    Portfolio,
    /// Comma-joined tickers in portfolio order.
    Tickers,
    AssetCount,
    /// Annualized risk-free rate as a fraction.
    RiskFreeRate,
    /// Equal-weighted mean of the asset returns, unrounded.
    PortfolioReturn,
    /// Semi-deviation below zero, unrounded.
    DownsideRisk,
    /// Rounded ratio; `0` when `ratio_undefined` is true.
    SortinoRatio,
    /// Downside risk was zero and the ratio is infinite.
    RatioUndefined,
    /// Fault message of a failed evaluation.
    Error,
}

impl From<SortinoReportCol> for PlSmallStr {
    fn from(value: SortinoReportCol) -> Self {
        value.as_str().into()
    }
}

impl SortinoReportCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use polars::prelude::AnyValue;

    use super::*;
    use crate::{
        calculator::sortino::SortinoCalculator,
        data::{common::RiskMetricsConfig, domain::Portfolio, domain::Ticker, window::DateWindow},
        report::io::ToJson,
        source::memory::InMemorySource,
    };

    fn batch() -> BatchEvaluation {
        let window = DateWindow::default();
        let source = [("AZN", 110.0), ("GSK", 95.0), ("TSCO", 120.0)].iter().fold(
            InMemorySource::new(),
            |source, (symbol, end)| {
                let t: Ticker = symbol.parse().expect("valid ticker");
                source
                    .with_close(&t, window.start(), 100.0)
                    .with_close(&t, window.end(), *end)
            },
        );
        let calc = SortinoCalculator::new(
            source,
            RiskMetricsConfig::default().with_annual_risk_free_rate_bps(500),
        );

        let portfolios = [
            Portfolio::from_symbols(&["AZN", "GSK", "TSCO"]).expect("valid"),
            Portfolio::from_symbols(&["AZN", "DELISTED"])
                .expect("valid")
                .with_name("broken"),
            Portfolio::from_symbols(&["AZN", "TSCO"]).expect("valid"),
        ];
        calc.evaluate_batch(&portfolios)
    }

    #[test]
    fn test_schema_matches_column_enum() {
        let schema = SortinoReport::to_schema();
        let names = schema
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>();
        let want = SortinoReportCol::iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>();

        assert_eq!(names, want);
        assert_eq!(names.len(), SortinoReportCol::COUNT);
        assert_eq!(
            names.iter().copied().collect::<HashSet<_>>().len(),
            SortinoReportCol::COUNT,
            "column names must be unique"
        );
    }

    #[test]
    fn test_report_has_one_row_per_portfolio() {
        let report = SortinoReport::try_from(&batch()).expect("report");
        let df = report.as_df();

        assert_eq!(df.height(), 3);
        assert_eq!(df.schema().as_ref(), SortinoReport::to_schema().as_ref());

        let ratio = df
            .column(SortinoReportCol::SortinoRatio.as_str())
            .expect("ratio column");
        assert_eq!(ratio.get(0).expect("row 0"), AnyValue::Float64(1.1547));
        assert_eq!(ratio.get(1).expect("row 1"), AnyValue::Null);
        assert_eq!(ratio.get(2).expect("row 2"), AnyValue::Float64(0.0));

        let undefined = df
            .column(SortinoReportCol::RatioUndefined.as_str())
            .expect("flag column");
        assert_eq!(undefined.get(0).expect("row 0"), AnyValue::Boolean(false));
        assert_eq!(undefined.get(2).expect("row 2"), AnyValue::Boolean(true));
    }

    #[test]
    fn test_failed_portfolio_keeps_error_message() {
        let json = SortinoReport::try_from(&batch())
            .expect("report")
            .to_json()
            .expect("json");
        let rows = json.as_array().expect("rows");

        assert_eq!(rows[1]["portfolio"], "broken");
        assert_eq!(rows[1]["tickers"], "AZN,DELISTED");
        assert_eq!(rows[1]["asset_count"], 2);
        assert_eq!(rows[1]["downside_risk"], serde_json::Value::Null);
        let msg = rows[1]["error"].as_str().expect("error text");
        assert!(msg.contains("DELISTED"), "{msg}");

        assert_eq!(rows[0]["error"], serde_json::Value::Null);
        assert_eq!(rows[0]["risk_free_rate"], 0.05);
    }

    #[test]
    fn test_empty_batch_yields_empty_report() {
        let report = SortinoReport::try_from(&BatchEvaluation::default()).expect("report");
        assert_eq!(report.as_df().height(), 0);
        assert_eq!(report.as_df().width(), SortinoReportCol::COUNT);
    }
}
