use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    data::{
        common::{PriceLookup, RiskMetricsConfig},
        domain::{AssetReturn, Price, Ticker},
        window::DateWindow,
    },
    error::{DataError, MetricError, SortinoResult},
    source::{MarketDataSource, PriceSeries},
};

/// How one asset performed over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPerformance {
    pub ticker: Ticker,
    /// Date the start price was observed on.
    pub start_date: NaiveDate,
    pub start_price: Price,
    /// Date the end price was observed on.
    pub end_date: NaiveDate,
    pub end_price: Price,
    /// Sum of all dividends paid in `start ..= end + 1 day`.
    pub dividends: Price,
    pub total_return: AssetReturn,
}

/// Total return of a single asset: price change plus dividends, relative to
/// the start price.
///
/// ```math
/// r = (P_{end} - P_{start} + D) / P_{start}
/// ```
///
/// # Errors
/// Returns `MetricError::DivisionByZero` if `start_price` is zero.
pub fn total_return(
    ticker: &Ticker,
    start_price: Price,
    end_price: Price,
    dividends: Price,
) -> SortinoResult<AssetReturn> {
    if start_price.0 == 0.0 {
        return Err(MetricError::DivisionByZero {
            ticker: ticker.to_string(),
        }
        .into());
    }

    let gain = end_price - start_price + dividends;
    Ok(AssetReturn(gain.0 / start_price.0))
}

/// Computes [`AssetPerformance`] for single tickers against one provider.
///
/// Holds only shared references and copies of the configuration, so one
/// instance can serve many threads at once.
pub struct AssetReturnCalculator<'a> {
    source: &'a dyn MarketDataSource,
    window: DateWindow,
    lookup: PriceLookup,
}

impl<'a> AssetReturnCalculator<'a> {
    pub fn new(source: &'a dyn MarketDataSource, config: &RiskMetricsConfig) -> Self {
        Self {
            source,
            window: *config.window(),
            lookup: config.price_lookup(),
        }
    }

    /// # Errors
    /// - `DataError::MissingPrice` if no usable close exists for a boundary date.
    /// - `DataError::InvalidPrice` if a price or dividend is NaN or infinite.
    /// - `MetricError::DivisionByZero` if the start price is zero.
    /// - Any error the provider reports.
    pub fn compute(&self, ticker: &Ticker) -> SortinoResult<AssetPerformance> {
        let start = self.window.start();
        let end = self.window.end();
        let query_end = self.window.query_end();

        let dividend_series = self.source.dividends(ticker, start, query_end)?;
        if let Some((date, amount)) = dividend_series.iter().find(|(_, a)| !a.is_finite()) {
            return Err(DataError::InvalidPrice {
                ticker: ticker.to_string(),
                date: *date,
                value: amount.0,
            }
            .into());
        }
        let dividends: Price = dividend_series.values().sum();

        let closes = self.source.close_prices(ticker, start, query_end)?;
        let (start_date, start_price) = self.boundary_price(ticker, &closes, start, end)?;
        let (end_date, end_price) = self.boundary_price(ticker, &closes, end, query_end)?;

        let total_return = total_return(ticker, start_price, end_price, dividends)?;

        debug!(
            %ticker,
            %start_date,
            start_price = start_price.0,
            %end_date,
            end_price = end_price.0,
            dividends = dividends.0,
            dividend_count = dividend_series.len(),
            total_return = total_return.0,
            "Asset return computed"
        );

        Ok(AssetPerformance {
            ticker: ticker.clone(),
            start_date,
            start_price,
            end_date,
            end_price,
            dividends,
            total_return,
        })
    }

    /// Picks the close for `target`, searching no further than `limit` when
    /// the lookup rule allows a later trading day.
    fn boundary_price(
        &self,
        ticker: &Ticker,
        closes: &PriceSeries,
        target: NaiveDate,
        limit: NaiveDate,
    ) -> SortinoResult<(NaiveDate, Price)> {
        let found = match self.lookup {
            PriceLookup::Exact => closes.get_key_value(&target),
            PriceLookup::OnOrAfter => closes.range(target..=limit).next(),
        };

        let (date, price) = found
            .map(|(d, p)| (*d, *p))
            .ok_or_else(|| DataError::MissingPrice {
                ticker: ticker.to_string(),
                date: target,
            })?;

        if !price.is_finite() {
            return Err(DataError::InvalidPrice {
                ticker: ticker.to_string(),
                date,
                value: price.0,
            }
            .into());
        }

        Ok((date, price))
    }
}
