use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use sortino::prelude::*;
use strum::IntoEnumIterator;
use time::macros::format_description;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{format::FmtSpan, time::UtcTime},
};

/// Usage: `cargo run --example portfolio_sortino -- [DATA_DIR] [REPORT_DIR]`
///
/// Defaults to the bundled CSV fixtures and a directory under the system
/// temp dir.
fn main() -> Result<()> {
    let _guard = init_tracing()?;

    let mut args = env::args().skip(1);
    let data_dir = args.next().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/market_data")
    });
    let report_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("sortino-reports"));

    let calc = SortinoCalculator::new(
        CsvDirSource::new(&data_dir),
        RiskMetricsConfig::default(),
    );
    let portfolios = PortfolioPreset::iter()
        .map(Portfolio::from)
        .collect::<Vec<_>>();

    let start = Instant::now();
    let batch = calc.evaluate_batch(&portfolios);
    let elapsed = start.elapsed();

    for entry in batch.entries() {
        match &entry.result {
            Ok(outcome) => println!("{outcome}\n"),
            Err(e) => println!("Portfolio: {}\n  failed: {e}\n", entry.portfolio),
        }
    }

    let summary = SortinoReport::try_from(&batch)?;
    let assets = AssetReturnsReport::try_from(&batch)?;
    let summary_path = summary
        .to_csv(&report_dir)
        .context("Failed to write Sortino report")?;
    let assets_path = assets
        .to_csv(&report_dir)
        .context("Failed to write asset returns report")?;

    println!("--- Reports ---");
    println!("{}", summary_path.display());
    println!("{}", assets_path.display());
    println!("Evaluated {} portfolios in {elapsed:?}", batch.len());

    drop(_guard);

    Ok(())
}

// ================================================================================================
// Tracing Configuration
// ================================================================================================

/// Portfolio evaluations are instrumented, so closing spans carry the time
/// spent per portfolio. `SORTINO_LOG` overrides the `sortino=info` filter.
fn init_tracing() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_env("SORTINO_LOG")
        .unwrap_or_else(|_| EnvFilter::new("sortino=info"));

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(UtcTime::rfc_3339());

    if env::var_os("CONTAINER").is_some() {
        subscriber.init();
        info!("Logging evaluations to stdout");
        return Ok(None);
    }

    let log_dir = dirs::state_dir()
        .unwrap_or_else(env::temp_dir)
        .join("sortino")
        .join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    let timestamp = time::OffsetDateTime::now_utc()
        .format(&format_description!("[year][month][day]-[hour][minute][second]"))
        .context("Failed to format timestamp")?;
    let file_name = format!("evaluation-{timestamp}.log");

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, &file_name));
    subscriber.with_writer(writer).init();

    info!(log_file = %log_dir.join(&file_name).display(), "Logging evaluations to file");
    Ok(Some(guard))
}
