// 1. Traits
pub use crate::report::io::{Report, ReportName, ToCsv, ToJson, ToSchema};
pub use crate::source::MarketDataSource;

// 2. Calculation
pub use crate::calculator::{
    AssetPerformance, BatchEntry, BatchEvaluation, SortinoCalculator, SortinoOutcome,
    SortinoRatio, downside_risk, portfolio_return, total_return,
};

// 3. Domain Types
pub use crate::data::domain::{AssetReturn, Portfolio, PortfolioPreset, Price, Ticker};
pub use crate::data::window::DateWindow;

// 4. Configuration
pub use crate::data::common::{PriceLookup, RiskMetricsConfig};

// 5. Providers
pub use crate::source::{PriceSeries, csv::CsvDirSource, memory::InMemorySource};

// 6. Reports
pub use crate::report::{asset_returns::AssetReturnsReport, sortino_report::SortinoReport};

// 7. Errors
pub use crate::error::{
    ConfigError, DataError, IoError, MetricError, SortinoError, SortinoResult, SystemError,
    TransportError,
};
