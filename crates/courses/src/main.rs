use anyhow::Context as _;
use clap::Parser;
use courses::browse::AppState;
use courses::catalog::run_build;
use courses::cli::{Cli, Command, ListArgs};
use courses::config::BuildConfig;
use courses::errors::CatalogError;
use courses::geocode::PhotonGeocoder;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    match Cli::parse().command {
        Command::Build(args) => build(args.into()).await,
        Command::List(args) => list(&args),
    }
}

async fn build(config: BuildConfig) -> anyhow::Result<()> {
    let geocoder = PhotonGeocoder::from_config(&config.geocoder)
        .context("Failed to create geocoding client")?;

    // An interrupt drops the build future before the catalog is written.
    tokio::select! {
        result = run_build(&config, geocoder) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Received CTRL+C, discarding partial catalog");
            return Err(CatalogError::Interrupted.into());
        }
    }

    Ok(())
}

fn list(args: &ListArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("Failed to read {}", args.catalog.display()))?;
    let mut state = AppState::from_json(&json)
        .with_context(|| format!("Could not load {}", args.catalog.display()))?;

    state.apply(args.criteria());
    let cards = state.cards(&args.asset_base);
    for card in &cards {
        println!("{}\t{}\t{}", card.title, card.summary, card.file_url);
    }
    println!("{} of {} courses", cards.len(), state.all_courses.len());

    Ok(())
}
