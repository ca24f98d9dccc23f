//! Writes the demo GPX set used to preview the course listing.
//!
//! Run with:
//! ```
//! FIXTURE_DIR=assets/gpx cargo run -p test-data --bin make-fixtures
//! ```

use test_data::config::FixtureConfig;
use test_data::fixtures::write_demo_set;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let defaults = FixtureConfig::default();
    let config = FixtureConfig {
        output_dir: std::env::var("FIXTURE_DIR")
            .map(Into::into)
            .unwrap_or(defaults.output_dir),
        seed: std::env::var("FIXTURE_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.seed),
        include_malformed: std::env::var("FIXTURE_MALFORMED").is_ok_and(|v| v == "1"),
        ..defaults
    };

    let written = write_demo_set(&config)?;

    tracing::info!("Fixtures written to {}", config.output_dir.display());
    for path in &written {
        tracing::info!("  {}", path.display());
    }

    Ok(())
}
