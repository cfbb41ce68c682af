//! Sortino ratio of equal-weighted portfolios over a fixed historical window.
//!
//! Every asset's total return (price change plus dividends) is fetched from a
//! [`source::MarketDataSource`], averaged into the portfolio return, and set
//! against the downside risk of the same returns. See
//! [`calculator::SortinoCalculator`] for the entry point.

pub mod calculator;
pub mod data;
pub mod error;
mod macros;
pub mod math;
pub mod prelude;
pub mod report;
pub mod source;
