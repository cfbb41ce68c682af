//! Market data providers.
//!
//! The numeric pipeline only ever asks a provider two questions: which
//! closing prices and which dividend payments a ticker had in a date range.

pub mod csv;
pub mod memory;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    data::domain::{Price, Ticker},
    error::SortinoResult,
};

/// Values keyed by calendar date, in ascending date order.
pub type PriceSeries = BTreeMap<NaiveDate, Price>;

/// Query contract of a historical market data provider.
///
/// Both bounds are **inclusive**. Dates without a record (weekends,
/// holidays) are simply absent from the returned series; an empty series is
/// a valid answer. Implementations report an unknown ticker as
/// `DataError::UnknownTicker` and provider-side failures (network, timeout)
/// as `TransportError`.
pub trait MarketDataSource: Send + Sync {
    /// Closing price per trading day in `start ..= end`.
    fn close_prices(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries>;

    /// Dividend amount per payment date in `start ..= end`.
    fn dividends(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries>;
}

impl<T: MarketDataSource + ?Sized> MarketDataSource for std::sync::Arc<T> {
    fn close_prices(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries> {
        (**self).close_prices(ticker, start, end)
    }

    fn dividends(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries> {
        (**self).dividends(ticker, start, end)
    }
}
