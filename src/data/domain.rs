use std::{collections::HashSet, fmt, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{ConfigError, DataError, MetricError, SortinoError, SortinoResult},
    impl_add_sub_sum_f64, impl_from_primitive,
};

// ================================================================================================
// Domain Strong Types (NewTypes)
// ================================================================================================

/// Opaque identifier of a tradable asset (e.g. `AZN`, `GLEN.L`).
///
/// The only structure enforced is that the identifier is not blank;
/// surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = SortinoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DataError::InvalidTicker(value).into());
        }
        Ok(Ticker(trimmed.to_string()))
    }
}

impl FromStr for Ticker {
    type Err = SortinoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::try_from(s.to_string())
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A closing price or a dividend amount, in the asset's quote currency.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(pub f64);
impl_from_primitive!(Price, f64);
impl_add_sub_sum_f64!(Price);

impl Price {
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

/// Total return of one asset over the measurement window, as a ratio.
///
/// `0.12` means +12%. Carried at full precision; never rounded.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct AssetReturn(pub f64);
impl_from_primitive!(AssetReturn, f64);
impl_add_sub_sum_f64!(AssetReturn);

impl AssetReturn {
    /// Strictly negative returns are the only ones that count as downside.
    pub fn is_downside(&self) -> bool {
        self.0 < 0.0
    }
}

// ================================================================================================
// Portfolio
// ================================================================================================

/// An equally weighted set of unique tickers.
///
/// Ticker order is preserved: the i-th asset return computed for a portfolio
/// always belongs to the i-th ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PortfolioDef", into = "PortfolioDef")]
pub struct Portfolio {
    name: String,
    tickers: Vec<Ticker>,
}

impl Portfolio {
    /// Builds a portfolio named after its tickers (e.g. `AZN,GSK`).
    ///
    /// # Errors
    /// - `MetricError::InvalidInput` if `tickers` is empty.
    /// - `ConfigError::InvalidPortfolio` if a ticker appears twice.
    pub fn new<I>(tickers: I) -> SortinoResult<Self>
    where
        I: IntoIterator<Item = Ticker>,
    {
        let tickers = tickers.into_iter().collect::<Vec<_>>();
        if tickers.is_empty() {
            return Err(MetricError::InvalidInput(
                "Portfolio must contain at least one ticker".to_string(),
            )
            .into());
        }

        let mut seen = HashSet::with_capacity(tickers.len());
        if let Some(dup) = tickers.iter().find(|t| !seen.insert(*t)) {
            return Err(ConfigError::InvalidPortfolio(format!("Duplicate ticker '{dup}'")).into());
        }

        Ok(Self {
            name: tickers.iter().join(","),
            tickers,
        })
    }

    /// Parses every symbol as a [`Ticker`] and builds the portfolio.
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> SortinoResult<Self> {
        let tickers = symbols
            .iter()
            .map(|s| s.as_ref().parse::<Ticker>())
            .collect::<SortinoResult<Vec<_>>>()?;
        Self::new(tickers)
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// Serialized form of a [`Portfolio`]; deserialization re-runs validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PortfolioDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    tickers: Vec<Ticker>,
}

impl TryFrom<PortfolioDef> for Portfolio {
    type Error = SortinoError;

    fn try_from(value: PortfolioDef) -> Result<Self, Self::Error> {
        let portfolio = Portfolio::new(value.tickers)?;
        Ok(match value.name {
            Some(name) => portfolio.with_name(name),
            None => portfolio,
        })
    }
}

impl From<Portfolio> for PortfolioDef {
    fn from(value: Portfolio) -> Self {
        Self {
            name: Some(value.name),
            tickers: value.tickers,
        }
    }
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.tickers.iter().join(", "))
    }
}

// ================================================================================================
// Preset Portfolios
// ================================================================================================

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
#[serde(rename_all = "snake_case")]
pub enum PortfolioPreset {
    /// **London-listed blend**: mining, grocery retail and pharma.
    ///
    /// * GLEN.L, MRW.L, AZN
    FtseBlend,

    /// **Defensive large caps**: insurance, retail and pharma.
    ///
    /// * LGEN.L, TSCO, GSK
    FtseDefensive,

    /// **Mixed stress portfolio** of nine assets, including several with
    /// large drawdowns over 2020/2021.
    GlobalMixed,
}

impl PortfolioPreset {
    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            PortfolioPreset::FtseBlend => &["GLEN.L", "MRW.L", "AZN"],
            PortfolioPreset::FtseDefensive => &["LGEN.L", "TSCO", "GSK"],
            PortfolioPreset::GlobalMixed => &[
                "GLEN.L", "MRW.L", "AZN", "NKLA", "TSLA", "MSFT", "AMZN", "FNMA", "SPCE",
            ],
        }
    }
}

impl From<PortfolioPreset> for Portfolio {
    fn from(preset: PortfolioPreset) -> Self {
        Portfolio {
            name: preset.to_string(),
            tickers: preset
                .symbols()
                .iter()
                .map(|s| Ticker(s.to_string()))
                .collect(),
        }
    }
}
