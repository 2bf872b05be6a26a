pub mod cli;
pub mod config;
pub mod core;
pub mod log;
pub mod orchestrator;
pub mod providers;

use crate::config::AppConfig;
use crate::core::pair::CurrencyPair;
use crate::core::source::{ForecastParams, HistoryParams};
use crate::orchestrator::{SourceSet, SyncOrchestrator};
use crate::providers::fallback::FallbackGenerator;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    /// One-shot fetch and render.
    Snapshot { pair: Option<CurrencyPair> },
    /// Continuous sync with the periodic rates refresh.
    Watch {
        pair: Option<CurrencyPair>,
        interval_secs: Option<u64>,
    },
}

/// Wires the HTTP sources against the configured service endpoint. The base
/// URL arrives already resolved; environment detection is the caller's
/// concern.
pub fn build_orchestrator(config: &AppConfig) -> Arc<SyncOrchestrator> {
    let fallback = FallbackGenerator::new();
    let base_url = &config.service.base_url;
    let sources = SourceSet {
        rates: Arc::new(providers::rates::HttpRateSource::new(base_url, fallback)),
        history: Arc::new(providers::history::HttpHistorySource::new(
            base_url, fallback,
        )),
        news: Arc::new(providers::news::HttpNewsSource::new(base_url, fallback)),
        forecast: Arc::new(providers::forecast::HttpForecastSource::new(
            base_url, fallback,
        )),
    };
    Arc::new(SyncOrchestrator::new(
        sources,
        HistoryParams {
            period: config.history.period.clone(),
            limit: config.history.limit,
        },
        ForecastParams {
            model: config.forecast.model.clone(),
            horizon: config.forecast.horizon,
        },
        config.tracked_pair,
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxsync starting...");

    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Snapshot { pair } => {
            if let Some(pair) = pair {
                config.tracked_pair = pair;
            }
            snapshot(&config).await
        }
        AppCommand::Watch {
            pair,
            interval_secs,
        } => {
            if let Some(pair) = pair {
                config.tracked_pair = pair;
            }
            if let Some(secs) = interval_secs {
                config.refresh_interval_secs = secs;
            }
            watch(&config).await
        }
    }
}

async fn snapshot(config: &AppConfig) -> Result<()> {
    let orchestrator = build_orchestrator(config);

    let spinner = cli::ui::new_spinner("Fetching market data...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    orchestrator.initialize().await;
    spinner.finish_and_clear();

    let state = orchestrator.snapshot().await;
    println!("{}", cli::render::render_snapshot(&state));
    Ok(())
}

async fn watch(config: &AppConfig) -> Result<()> {
    let orchestrator = build_orchestrator(config);
    let mut updates = orchestrator.subscribe();

    let spinner = cli::ui::new_spinner("Fetching market data...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    orchestrator.initialize().await;
    spinner.finish_and_clear();

    println!(
        "{}",
        cli::render::render_snapshot(&orchestrator.snapshot().await)
    );
    // Everything up to here has been rendered already.
    updates.borrow_and_update();

    let refresh =
        orchestrator.spawn_refresh_task(Duration::from_secs(config.refresh_interval_secs));
    info!(
        "Watching {} (refresh every {}s), press Ctrl-C to exit",
        orchestrator.snapshot().await.tracked_pair,
        config.refresh_interval_secs
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                println!("{}", cli::render::render_snapshot(&state));
            }
        }
    }

    refresh.stop();
    Ok(())
}
