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

/// Per-asset breakdown of every successfully evaluated portfolio.
#[derive(Debug, Clone)]
pub struct AssetReturnsReport {
    pub df: DataFrame,
}

impl Default for AssetReturnsReport {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&AssetReturnsReport::to_schema());
        Self { df }
    }
}

impl ReportName for AssetReturnsReport {
    fn base_name(&self) -> String {
        "asset_returns".to_string()
    }
}

impl Report for AssetReturnsReport {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for AssetReturnsReport {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = AssetReturnsCol::iter()
            .map(|col| {
                let dtype = match col {
                    AssetReturnsCol::Portfolio | AssetReturnsCol::Ticker => DataType::String,
                    AssetReturnsCol::StartPrice
                    | AssetReturnsCol::EndPrice
                    | AssetReturnsCol::Dividends
                    | AssetReturnsCol::TotalReturn => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TryFrom<&BatchEvaluation> for AssetReturnsReport {
    type Error = SortinoError;

    fn try_from(batch: &BatchEvaluation) -> SortinoResult<Self> {
        let mut portfolio = Vec::new();
        let mut ticker = Vec::new();
        let mut start_price = Vec::new();
        let mut end_price = Vec::new();
        let mut dividends = Vec::new();
        let mut total_return = Vec::new();

        for outcome in batch.outcomes() {
            for asset in &outcome.assets {
                portfolio.push(outcome.portfolio.clone());
                ticker.push(asset.ticker.to_string());
                start_price.push(asset.start_price.0);
                end_price.push(asset.end_price.0);
                dividends.push(asset.dividends.0);
                total_return.push(asset.total_return.0);
            }
        }

        if portfolio.is_empty() {
            return Ok(Self::default());
        }

        let df = df!(
            AssetReturnsCol::Portfolio.to_string() => portfolio,
            AssetReturnsCol::Ticker.to_string() => ticker,
            AssetReturnsCol::StartPrice.to_string() => start_price,
            AssetReturnsCol::EndPrice.to_string() => end_price,
            AssetReturnsCol::Dividends.to_string() => dividends,
            AssetReturnsCol::TotalReturn.to_string() => total_return,
        )
        .map_err(|e| polars_to_sortino_error("asset returns report", e))?;

        Ok(Self { df })
    }
}

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
pub enum AssetReturnsCol {
    Portfolio,
    Ticker,
    StartPrice,
    EndPrice,
    /// Dividends paid through the day after the window end.
    Dividends,
    TotalReturn,
}

impl From<AssetReturnsCol> for PlSmallStr {
    fn from(value: AssetReturnsCol) -> Self {
        value.as_str().into()
    }
}

impl AssetReturnsCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calculator::sortino::SortinoCalculator,
        data::{
            common::RiskMetricsConfig,
            domain::{Portfolio, Ticker},
            window::DateWindow,
        },
        report::io::ToJson,
        source::memory::InMemorySource,
    };

    #[test]
    fn test_only_successful_portfolios_contribute_rows() {
        let window = DateWindow::default();
        let azn: Ticker = "AZN".parse().expect("valid ticker");
        let gsk: Ticker = "GSK".parse().expect("valid ticker");
        let source = InMemorySource::new()
            .with_close(&azn, window.start(), 50.0)
            .with_close(&azn, window.end(), 55.0)
            .with_dividend(&azn, window.end(), 2.5)
            .with_close(&gsk, window.start(), 20.0)
            .with_close(&gsk, window.end(), 18.0);
        let calc = SortinoCalculator::new(source, RiskMetricsConfig::default());

        let portfolios = [
            Portfolio::from_symbols(&["AZN", "GSK"]).expect("valid"),
            Portfolio::from_symbols(&["GSK", "DELISTED"]).expect("valid"),
        ];
        let report =
            AssetReturnsReport::try_from(&calc.evaluate_batch(&portfolios)).expect("report");

        assert_eq!(report.as_df().height(), 2);
        assert_eq!(report.as_df().width(), AssetReturnsCol::COUNT);

        let rows = report.to_json().expect("json");
        let rows = rows.as_array().expect("rows");
        assert_eq!(rows[0]["portfolio"], "AZN,GSK");
        assert_eq!(rows[0]["ticker"], "AZN");
        assert_eq!(rows[0]["dividends"], 2.5);
        assert_eq!(rows[0]["total_return"], 0.15);
        assert_eq!(rows[1]["ticker"], "GSK");
        assert_eq!(rows[1]["total_return"], -0.1);
    }

    #[test]
    fn test_empty_batch_keeps_schema() {
        let report = AssetReturnsReport::try_from(&BatchEvaluation::default()).expect("report");
        let names = report
            .as_df()
            .get_column_names()
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "portfolio",
                "ticker",
                "start_price",
                "end_price",
                "dividends",
                "total_return"
            ]
        );
    }
}
