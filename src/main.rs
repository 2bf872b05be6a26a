use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxsync::core::pair::CurrencyPair;
use fxsync::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_pair(s: &str) -> Result<CurrencyPair, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch once and print the market board
    Snapshot {
        /// Pair to track, e.g. USD/EUR
        #[arg(short, long, value_parser = parse_pair)]
        pair: Option<CurrencyPair>,
    },
    /// Keep the market board synchronized until interrupted
    Watch {
        /// Pair to track, e.g. USD/EUR
        #[arg(short, long, value_parser = parse_pair)]
        pair: Option<CurrencyPair>,
        /// Seconds between rate refreshes
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

impl From<Commands> for fxsync::AppCommand {
    fn from(cmd: Commands) -> fxsync::AppCommand {
        match cmd {
            Commands::Snapshot { pair } => fxsync::AppCommand::Snapshot { pair },
            Commands::Watch { pair, interval } => fxsync::AppCommand::Watch {
                pair,
                interval_secs: interval,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxsync::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxsync::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
service:
  base_url: "http://localhost:5000"

tracked_pair: "USD/EUR"
refresh_interval_secs: 30

history:
  period: "24h"
  limit: 20

forecast:
  model: "ensemble"
  horizon: 12
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
