#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use sortino::prelude::*;

pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/market_data")
}

pub fn setup_data_source() -> Arc<dyn MarketDataSource> {
    Arc::new(CsvDirSource::new(fixture_dir()))
}

pub fn setup_calculator(config: RiskMetricsConfig) -> SortinoCalculator<Arc<dyn MarketDataSource>> {
    SortinoCalculator::new(setup_data_source(), config)
}

pub fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sortino-it-{name}-{}", std::process::id()))
}

pub fn assert_close(have: f64, want: f64, tol: f64, what: &str) {
    assert!(
        (have - want).abs() < tol,
        "{what}: got {have}, want {want} (tolerance {tol})"
    );
}
