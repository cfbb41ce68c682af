use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SortinoError, SortinoResult};

const DEFAULT_START: NaiveDate = match NaiveDate::from_ymd_opt(2020, 10, 15) {
    Some(date) => date,
    None => panic!("invalid default window start"),
};

const DEFAULT_END: NaiveDate = match NaiveDate::from_ymd_opt(2021, 10, 15) {
    Some(date) => date,
    None => panic!("invalid default window end"),
};

/// The measurement period of a Sortino evaluation.
///
/// Prices are taken on `start` and `end`. Every provider query is issued for
/// the inclusive range `start ..= end + 1 day`, so a provider whose upper
/// bound is exclusive still delivers the end date, and dividends paid on the
/// end date are never lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds", into = "WindowBounds")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
    query_end: NaiveDate,
}

impl Default for DateWindow {
    /// 2020-10-15 to 2021-10-15, the year ending on the date the default
    /// risk-free rate refers to.
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
            query_end: DEFAULT_END.succ_opt().unwrap_or(DEFAULT_END),
        }
    }
}

impl DateWindow {
    /// # Errors
    /// Returns `ConfigError::InvalidWindow` if `start >= end` or if `end` is
    /// the last representable date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> SortinoResult<Self> {
        if start >= end {
            return Err(ConfigError::InvalidWindow {
                start,
                end,
                msg: "start must be strictly before end".to_string(),
            }
            .into());
        }

        let query_end = end.succ_opt().ok_or_else(|| ConfigError::InvalidWindow {
            start,
            end,
            msg: "end date cannot be extended by one day".to_string(),
        })?;

        Ok(Self {
            start,
            end,
            query_end,
        })
    }

    /// Convenience constructor from calendar components.
    pub fn from_ymd(start: (i32, u32, u32), end: (i32, u32, u32)) -> SortinoResult<Self> {
        let to_date = |(y, m, d): (i32, u32, u32)| {
            NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| {
                SortinoError::from(ConfigError::InvalidConfig(format!(
                    "invalid calendar date {y:04}-{m:02}-{d:02}"
                )))
            })
        };
        Self::new(to_date(start)?, to_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive upper bound used for every provider query (`end + 1 day`).
    pub fn query_end(&self) -> NaiveDate {
        self.query_end
    }

    /// `true` if either boundary date falls on a Saturday or Sunday.
    pub(crate) fn has_weekend_boundary(&self) -> bool {
        [self.start, self.end]
            .iter()
            .any(|d| d.weekday().number_from_monday() > 5)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = SortinoError;

    fn try_from(value: WindowBounds) -> Result<Self, Self::Error> {
        DateWindow::new(value.start, value.end)
    }
}

impl From<DateWindow> for WindowBounds {
    fn from(value: DateWindow) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}
