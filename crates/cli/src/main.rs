use anyhow::Context;
use clap::{Parser, Subcommand};
use cointegrator_core::{AppConfig, CointError, ConfigLoader};
use cointegrator_selector::FileCointegrator;
use std::process::ExitCode;

mod report;

#[derive(Parser)]
#[command(name = "cointegrator")]
#[command(about = "Cointegrated pair scanner for statistical arbitrage", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Quote currency, overrides `storage.currency`
    #[arg(long, global = true, env = "COINT_CURRENCY")]
    currency: Option<String>,

    /// Drop the cached tables for this command and recompute them
    #[arg(long, global = true)]
    refresh: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan all symbol pairs and print the hot ones
    Scan,
    /// Print the best cointegrated pairs ranked by p-value
    BestPairs {
        /// Number of pairs to return (defaults to `selector.default_top`)
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Print the latest spread z-score of every evaluated pair
    Zscore,
    /// Build the normalized price / spread / z-score table of one pair
    Backtest {
        /// First coin of the pair
        #[arg(long)]
        coin1: String,
        /// Second coin of the pair
        #[arg(long)]
        coin2: String,
    },
}

/// Exit status when the run cannot proceed, e.g. missing price history.
const FATAL_EXIT_CODE: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli.config, cli.currency.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    tracing::info!(
        currency = %config.storage.currency,
        output_dir = %config.storage.output_dir.display(),
        "Starting cointegrator"
    );

    let service = FileCointegrator::from_config(config.clone());
    let refresh = cli.refresh;

    let outcome = match cli.command {
        Commands::Scan => run_scan(service, refresh).await,
        Commands::BestPairs { top } => {
            run_best_pairs(service, top.unwrap_or(config.selector.default_top), refresh).await
        }
        Commands::Zscore => run_zscore(service, refresh).await,
        Commands::Backtest { coin1, coin2 } => run_backtest(service, coin1, coin2, refresh).await,
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if is_fatal(&e) => {
            tracing::error!(error = %format!("{e:#}"), "Run aborted");
            Ok(ExitCode::from(FATAL_EXIT_CODE))
        }
        Err(e) => Err(e),
    }
}

/// True when any cause in the chain is a run-ending [`CointError`].
fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<CointError>())
        .any(CointError::is_fatal)
}

fn load_config(path: &str, currency: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut config = ConfigLoader::load_from(path)?;
    if let Some(currency) = currency {
        config.storage.currency = currency.to_string();
        config.validate().context("Invalid --currency override")?;
    }
    Ok(config)
}

async fn run_scan(service: FileCointegrator, refresh: bool) -> anyhow::Result<()> {
    let pairs = tokio::task::spawn_blocking(move || {
        if refresh {
            service.refresh_scan()?;
        }
        service.get_cointegration()
    })
        .await
        .context("Scan task failed")??;

    println!("{}", report::cointegration_table(&pairs));
    tracing::info!(hot_pairs = pairs.len(), "Scan finished");
    Ok(())
}

async fn run_best_pairs(service: FileCointegrator, top: usize, refresh: bool) -> anyhow::Result<()> {
    let pairs = tokio::task::spawn_blocking(move || {
        if refresh {
            service.refresh_scan()?;
        }
        service.get_best_cointegrated_pairs(top)
    })
        .await
        .context("Best-pairs task failed")??;

    println!("{}", report::ranked_table(&pairs));
    tracing::info!(requested = top, returned = pairs.len(), "Best pairs selected");
    Ok(())
}

async fn run_zscore(service: FileCointegrator, refresh: bool) -> anyhow::Result<()> {
    let zscores = tokio::task::spawn_blocking(move || {
        if refresh {
            service.refresh_scan()?;
        }
        service.get_zscore()
    })
        .await
        .context("Z-score task failed")??;

    println!("{}", report::zscore_summary(&zscores));
    tracing::info!(pairs = zscores.len(), "Z-scores loaded");
    Ok(())
}

async fn run_backtest(
    service: FileCointegrator,
    coin1: String,
    coin2: String,
    refresh: bool,
) -> anyhow::Result<()> {
    tracing::info!(coin1 = %coin1, coin2 = %coin2, refresh, "Building backtest");

    let (coin1, coin2, rows) = tokio::task::spawn_blocking(move || {
        if refresh {
            service.refresh_backtest(&coin1, &coin2)?;
        }
        service
            .get_backtests(&coin1, &coin2)
            .map(|rows| (coin1, coin2, rows))
    })
    .await
    .context("Backtest task failed")??;

    println!("{}", report::backtest_table(&coin1, &coin2, &rows));
    tracing::info!(rows = rows.len(), "Backtest finished");
    Ok(())
}
