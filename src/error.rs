use chrono::NaiveDate;
use thiserror::Error;

pub type SortinoResult<T> = Result<T, SortinoError>;

#[derive(Debug, Error)]
pub enum SortinoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    System(#[from] SystemError),
}

/// Errors related to market data availability and shape.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("No close price for '{ticker}' on {date}")]
    MissingPrice { ticker: String, date: NaiveDate },

    #[error("Unknown ticker: '{0}'")]
    UnknownTicker(String),

    #[error("Invalid ticker string: '{0}'")]
    InvalidTicker(String),

    #[error("Invalid price for '{ticker}' on {date}: {value}")]
    InvalidPrice {
        ticker: String,
        date: NaiveDate,
        value: f64,
    },

    #[error("Data frame error: {0}")]
    DataFrame(String),

    #[error("Failed to parse date: {0}")]
    DateParse(#[from] chrono::ParseError),
}

/// Errors raised by the numeric pipeline itself.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("Start price of '{ticker}' is zero, total return is undefined")]
    DivisionByZero { ticker: String },

    #[error("Invalid input to metric computation: {0}")]
    InvalidInput(String),
}

/// Errors related to user supplied configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid date window (start: {start}, end: {end}): {msg}")]
    InvalidWindow {
        start: NaiveDate,
        end: NaiveDate,
        msg: String,
    },

    #[error("Invalid portfolio: {0}")]
    InvalidPortfolio(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors surfaced by a market data provider while fetching.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Fetch failed for '{ticker}': {msg}")]
    Fetch { ticker: String, msg: String },

    #[error("Fetch timed out for '{ticker}'")]
    Timeout { ticker: String },
}

/// Errors related to File I/O and Serialization.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Failed to write data: {0}")]
    WriteFailed(String),
}

/// Errors related to internal invariants.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl SortinoError {
    /// Whether a required price or ticker is absent from the provider.
    ///
    /// Malformed data (`InvalidPrice`, `InvalidTicker`, `DataFrame`,
    /// `DateParse`) is not missing data.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            SortinoError::Data(DataError::MissingPrice { .. } | DataError::UnknownTicker(_))
        )
    }

    /// Whether the provider failed to answer (network, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, SortinoError::Transport(_))
    }

    pub fn is_division_by_zero(&self) -> bool {
        matches!(self, SortinoError::Metric(MetricError::DivisionByZero { .. }))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SortinoError::Metric(MetricError::InvalidInput(_))
                | SortinoError::Config(ConfigError::InvalidPortfolio(_))
        )
    }
}
