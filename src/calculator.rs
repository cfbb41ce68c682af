pub mod asset_return;
pub mod downside_risk;
pub mod portfolio_return;
pub mod sortino;

pub use asset_return::{AssetPerformance, AssetReturnCalculator, total_return};
pub use downside_risk::downside_risk;
pub use portfolio_return::portfolio_return;
pub use sortino::{BatchEntry, BatchEvaluation, SortinoCalculator, SortinoOutcome, SortinoRatio};
