mod cli;
mod metrics;
mod selector;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use debridlink_core::{
    load_config, validate_config, AllDebridClient, CandidateRelease, Config, DebridResolver,
    LinkOutcome, RealDebridConfig, RealDebridProvider, SanitizedConfig,
};

use cli::{Cli, Command, MagnetStatusCmd, ResolveCmd};
use selector::PromptSelector;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Determine config path
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("DEBRIDLINK_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Configuration: {:?}", SanitizedConfig::from(&config));

    let started = Instant::now();
    let (name, result) = match cli.command {
        Command::Resolve(cmd) => ("resolve", resolve(&config, cmd).await),
        Command::MagnetStatus(cmd) => ("magnet_status", magnet_status(&config, cmd).await),
    };
    metrics::COMMAND_DURATION
        .with_label_values(&[name])
        .observe(started.elapsed().as_secs_f64());
    result
}

async fn resolve(config: &Config, cmd: ResolveCmd) -> Result<()> {
    let Some(query) = cmd.source_query() else {
        bail!("Either --movie or --episode is required");
    };

    let raw = std::fs::read_to_string(&cmd.candidates)
        .with_context(|| format!("Failed to read candidates from {:?}", cmd.candidates))?;
    let mut candidates: Vec<CandidateRelease> =
        serde_json::from_str(&raw).context("Candidates file is not a JSON array of releases")?;
    info!("Loaded {} candidates", candidates.len());

    let rd_config = config
        .real_debrid
        .clone()
        .unwrap_or_else(|| RealDebridConfig::with_token(""));
    let provider = Arc::new(RealDebridProvider::from_config(rd_config));
    let selector = Arc::new(PromptSelector::stdin());
    let resolver = DebridResolver::new(provider, selector, config.resolver.clone());

    let results = resolver.resolve(&mut candidates, &query).await;
    println!("{}", serde_json::to_string_pretty(&results)?);

    if let Some(position) = cmd.play {
        let Some(result) = position.checked_sub(1).and_then(|i| results.get(i)) else {
            bail!("No result at position {} ({} resolved)", position, results.len());
        };

        info!("Fetching links for {}", result.title);
        match result.links.fetch().await? {
            LinkOutcome::Links(links) => println!("{}", serde_json::to_string_pretty(&links)?),
            LinkOutcome::Cancelled => info!("Selection cancelled"),
        }
    }

    if cmd.metrics {
        print!("{}", metrics::encode_metrics()?);
    }
    Ok(())
}

async fn magnet_status(config: &Config, cmd: MagnetStatusCmd) -> Result<()> {
    let Some(ad_config) = config.all_debrid.clone() else {
        bail!("all_debrid is not configured");
    };

    let client = AllDebridClient::from_config(ad_config);
    let response = client
        .magnet_status(cmd.id.as_deref(), cmd.status)
        .await
        .context("Magnet status request failed")?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
