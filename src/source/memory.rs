use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    data::domain::{Price, Ticker},
    error::{DataError, SortinoResult},
    source::{MarketDataSource, PriceSeries},
};

#[derive(Debug, Clone, Default)]
struct TickerHistory {
    closes: PriceSeries,
    dividends: PriceSeries,
}

/// A provider backed by series held in memory.
///
/// Intended for tests and for callers that already hold the data.
///
/// # Examples
///
/// ```
/// # use sortino::prelude::*;
/// # use chrono::NaiveDate;
/// let day = NaiveDate::from_ymd_opt(2020, 10, 15).unwrap();
/// let azn: Ticker = "AZN".parse().unwrap();
/// let source = InMemorySource::new().with_close(&azn, day, 54.1);
///
/// let closes = source.close_prices(&azn, day, day).unwrap();
/// assert_eq!(closes.get(&day), Some(&Price(54.1)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    history: HashMap<Ticker, TickerHistory>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ticker without any data (e.g. a delisted asset).
    pub fn with_ticker(mut self, ticker: &Ticker) -> Self {
        self.history.entry(ticker.clone()).or_default();
        self
    }

    pub fn with_close(mut self, ticker: &Ticker, date: NaiveDate, close: f64) -> Self {
        self.history
            .entry(ticker.clone())
            .or_default()
            .closes
            .insert(date, Price(close));
        self
    }

    pub fn with_closes<I>(self, ticker: &Ticker, closes: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        closes
            .into_iter()
            .fold(self, |source, (date, close)| source.with_close(ticker, date, close))
    }

    pub fn with_dividend(mut self, ticker: &Ticker, date: NaiveDate, amount: f64) -> Self {
        self.history
            .entry(ticker.clone())
            .or_default()
            .dividends
            .insert(date, Price(amount));
        self
    }

    fn history(&self, ticker: &Ticker) -> SortinoResult<&TickerHistory> {
        self.history
            .get(ticker)
            .ok_or_else(|| DataError::UnknownTicker(ticker.to_string()).into())
    }
}

fn slice(series: &PriceSeries, start: NaiveDate, end: NaiveDate) -> PriceSeries {
    if start > end {
        return PriceSeries::new();
    }
    series
        .range(start..=end)
        .map(|(date, price)| (*date, *price))
        .collect()
}

impl MarketDataSource for InMemorySource {
    fn close_prices(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries> {
        Ok(slice(&self.history(ticker)?.closes, start, end))
    }

    fn dividends(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries> {
        Ok(slice(&self.history(ticker)?.dividends, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SortinoError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let t: Ticker = "MSFT".parse().expect("ticker");
        let source = InMemorySource::new()
            .with_closes(
                &t,
                [
                    (date(2020, 10, 14), 1.0),
                    (date(2020, 10, 15), 2.0),
                    (date(2020, 10, 16), 3.0),
                    (date(2020, 10, 19), 4.0),
                ],
            )
            .with_dividend(&t, date(2020, 10, 16), 0.5);

        let closes = source
            .close_prices(&t, date(2020, 10, 15), date(2020, 10, 16))
            .expect("known ticker");
        assert_eq!(
            closes.into_iter().collect::<Vec<_>>(),
            vec![(date(2020, 10, 15), Price(2.0)), (date(2020, 10, 16), Price(3.0))]
        );

        let divs = source
            .dividends(&t, date(2020, 10, 16), date(2020, 10, 16))
            .expect("known ticker");
        assert_eq!(divs.len(), 1);

        let inverted = source
            .close_prices(&t, date(2020, 10, 19), date(2020, 10, 14))
            .expect("known ticker");
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_unknown_ticker() {
        let source = InMemorySource::new();
        let t: Ticker = "NOPE".parse().expect("ticker");
        let err = source
            .close_prices(&t, date(2020, 1, 1), date(2020, 2, 1))
            .expect_err("unknown ticker must fail");
        assert!(matches!(err, SortinoError::Data(DataError::UnknownTicker(ref s)) if s == "NOPE"));
    }
}
