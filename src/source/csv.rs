use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::NaiveDate;
use polars::prelude::{
    DataType, Field, LazyCsvReader, LazyFileListReader, PlPath, PlSmallStr, Schema, SchemaRef,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::debug;

use crate::{
    data::domain::{Price, Ticker},
    error::{DataError, IoError, SortinoResult},
    source::{MarketDataSource, PriceSeries},
};

/// Columns of a per-ticker history file.
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
)]
#[strum(serialize_all = "snake_case")]
pub enum MarketDataCol {
    /// Trading day, ISO formatted (`2021-10-15`).
    Date,
    /// Closing price. Empty when the venue did not trade.
    Close,
    /// Dividend paid on that day, `0` when none.
    Dividends,
}

impl From<MarketDataCol> for PlSmallStr {
    fn from(value: MarketDataCol) -> Self {
        value.as_str().into()
    }
}

impl MarketDataCol {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn schema() -> SchemaRef {
        let fields: Vec<Field> = MarketDataCol::iter()
            .map(|col| {
                let dtype = match col {
                    MarketDataCol::Date => DataType::String,
                    MarketDataCol::Close | MarketDataCol::Dividends => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

#[derive(Debug, Clone, Copy)]
struct DailyRecord {
    date: NaiveDate,
    close: Option<f64>,
    dividend: f64,
}

/// A provider reading one CSV file per ticker from a directory.
///
/// The file for `GLEN.L` is `<dir>/GLEN.L.csv` with the header
/// `date,close,dividends`. Files are read on every query; nothing is cached.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, ticker: &Ticker) -> SortinoResult<PathBuf> {
        let symbol = ticker.as_str();
        if symbol.contains(['/', '\\']) || symbol.starts_with('.') {
            return Err(DataError::InvalidTicker(symbol.to_string()).into());
        }

        let path = self.dir.join(format!("{symbol}.csv"));
        if !path.is_file() {
            return Err(DataError::UnknownTicker(symbol.to_string()).into());
        }
        Ok(path)
    }

    fn load(&self, ticker: &Ticker) -> SortinoResult<Vec<DailyRecord>> {
        let path = self.file_path(ticker)?;
        let uri = path.to_str().ok_or_else(|| {
            IoError::FileSystem(format!(
                "Path contains invalid UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let df = LazyCsvReader::new(PlPath::new(uri))
            .with_has_header(true)
            .with_schema(Some(MarketDataCol::schema()))
            .finish()
            .map_err(|e| DataError::DataFrame(format!("Failed to scan '{uri}': {e}")))?
            .collect()
            .map_err(|e| DataError::DataFrame(format!("Failed to read '{uri}': {e}")))?;

        let column_err = |e: polars::error::PolarsError| DataError::DataFrame(e.to_string());
        let dates = df
            .column(MarketDataCol::Date.as_str())
            .and_then(|c| c.str())
            .map_err(column_err)?;
        let closes = df
            .column(MarketDataCol::Close.as_str())
            .and_then(|c| c.f64())
            .map_err(column_err)?;
        let dividends = df
            .column(MarketDataCol::Dividends.as_str())
            .and_then(|c| c.f64())
            .map_err(column_err)?;

        let records = dates
            .into_iter()
            .zip(closes)
            .zip(dividends)
            .enumerate()
            .map(|(row, ((date, close), dividend))| -> SortinoResult<DailyRecord> {
                let date = date.ok_or_else(|| {
                    DataError::DataFrame(format!("Row {row} of '{uri}' has no date"))
                })?;
                Ok(DailyRecord {
                    date: NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                        .map_err(DataError::from)?,
                    close,
                    dividend: dividend.unwrap_or(0.0),
                })
            })
            .collect::<SortinoResult<Vec<_>>>()?;

        debug!(%ticker, rows = records.len(), file = %path.display(), "Loaded price history");
        Ok(records)
    }
}

impl MarketDataSource for CsvDirSource {
    fn close_prices(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries> {
        Ok(self
            .load(ticker)?
            .into_iter()
            .filter(|r| start <= r.date && r.date <= end)
            .filter_map(|r| r.close.map(|c| (r.date, Price(c))))
            .collect())
    }

    fn dividends(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SortinoResult<PriceSeries> {
        Ok(self
            .load(ticker)?
            .into_iter()
            .filter(|r| start <= r.date && r.date <= end && r.dividend > 0.0)
            .map(|r| (r.date, Price(r.dividend)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SortinoError;

    fn fixture_source() -> CsvDirSource {
        let manifest_dir = env!("CARGO_MANIFEST_DIR");
        CsvDirSource::new(PathBuf::from(manifest_dir).join("tests/fixtures/market_data"))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_close_prices_within_inclusive_range() {
        let source = fixture_source();
        let azn: Ticker = "AZN".parse().expect("ticker");

        let closes = source
            .close_prices(&azn, date(2020, 10, 15), date(2021, 10, 16))
            .expect("fixture exists");

        assert_eq!(closes.get(&date(2020, 10, 15)), Some(&Price(54.1)));
        assert_eq!(closes.get(&date(2021, 10, 15)), Some(&Price(60.25)));
        assert!(
            !closes.contains_key(&date(2020, 10, 14)),
            "dates before the range must be excluded"
        );
    }

    #[test]
    fn test_dividends_skip_zero_rows() {
        let source = fixture_source();
        let azn: Ticker = "AZN".parse().expect("ticker");

        let divs = source
            .dividends(&azn, date(2020, 10, 15), date(2021, 10, 16))
            .expect("fixture exists");

        assert_eq!(divs.len(), 2, "only rows with a positive dividend count");
        let total: Price = divs.values().sum();
        assert!((total.0 - 1.4).abs() < 1e-12, "got {}", total.0);
    }

    #[test]
    fn test_unknown_and_invalid_tickers() {
        let source = fixture_source();

        let missing: Ticker = "DELISTED".parse().expect("ticker");
        let err = source
            .close_prices(&missing, date(2020, 1, 1), date(2021, 1, 1))
            .expect_err("no file for ticker");
        assert!(err.is_missing_data(), "unexpected error: {err}");

        let escape: Ticker = "../secrets".parse().expect("ticker");
        let err = source
            .close_prices(&escape, date(2020, 1, 1), date(2021, 1, 1))
            .expect_err("path escape must fail");
        assert!(matches!(err, SortinoError::Data(DataError::InvalidTicker(_))));
    }

    #[test]
    fn test_schema_matches_columns() {
        let schema = MarketDataCol::schema();
        let names = schema
            .iter()
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["date", "close", "dividends"]);
    }
}
