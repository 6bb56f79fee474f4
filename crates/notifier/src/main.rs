//! Walk-in Notifier - Main Entry Point
//!
//! One-shot pass (`run`), periodic passes (`watch`) or a dry run (`preview`).

mod logging;
mod output;
mod settings;
mod wiring;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use settings::Settings;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use walkin_core::application::{shutdown_channel, NotifyScheduler};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "walkin-notifier")]
#[command(about = "Text walk-in customers when their turn is near", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Exit non-zero when any message fails to send or mark
    #[arg(long, global = true, env = "WALKIN_STRICT")]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single notification pass (default)
    Run,

    /// Run passes periodically until Ctrl+C
    Watch {
        /// Seconds between passes
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show who would be notified, without sending anything
    Preview {
        /// Print decisions as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Notifier failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitCode> {
    info!("Walk-in notifier v{} starting...", VERSION);

    let mut settings = Settings::load().context("Invalid configuration")?;
    if let Some(Commands::Watch {
        interval: Some(secs),
    }) = &cli.command
    {
        settings.watch_interval_secs = *secs;
        settings.validate().context("Invalid configuration")?;
    }

    let service = wiring::build_service(&settings).await?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let report = service.run_pass().await.context("Notification pass failed")?;
            println!("{}", output::report_summary(&report));

            if cli.strict && !report.is_clean() {
                warn!(failures = report.dispatch.failures(), "Strict mode: failing run");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Watch { .. } => {
            let (shutdown_tx, shutdown_rx) = shutdown_channel();
            let scheduler = NotifyScheduler::new(Arc::new(service), settings.watch_interval());
            let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

            info!("Press Ctrl+C to shutdown");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl+C")?;

            info!("Shutdown signal received. Finishing current pass...");
            shutdown_tx.shutdown();
            match tokio::time::timeout(Duration::from_secs(30), handle).await {
                Ok(Ok(passes)) => info!(passes = passes, "Shutdown complete."),
                Ok(Err(e)) => warn!(error = %e, "Scheduler task ended abnormally"),
                Err(_) => warn!("Timed out waiting for the current pass"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Preview { json } => {
            let decided = service.preview().await.context("Preview failed")?;
            let rows = output::decision_rows(&decided);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{}", output::preview_table(rows));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
