use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use querydrop_core::config::{load_env_file, Settings};
use querydrop_scheduler::{ScheduleMode, SchedulerEngine};
use tracing::{error, info, warn};

mod job;

use job::ExportJob;

/// Run a SQL query on a schedule and deliver the result as CSV,
/// pipe-delimited text or PDF, locally or over SFTP.
#[derive(Parser, Debug)]
#[command(name = "querydrop", version, about)]
struct Cli {
    /// Settings file. Falls back to $QUERYDROP_CONFIG, then ./querydrop.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dotenv file loaded before settings are read (default: ./.env).
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Run the job once and exit, ignoring the configured interval.
    #[arg(long, default_value_t = false)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Must precede the subscriber so RUST_LOG from the dotenv file applies.
    let env_file = load_env_file(cli.env_file.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "querydrop=info,querydrop_=info".into()),
        )
        .init();

    match (env_file, &cli.env_file) {
        (Some(path), _) => info!(path = %path.display(), "loaded environment file"),
        (None, Some(wanted)) => warn!(path = %wanted.display(), "environment file not loaded"),
        (None, None) => {}
    }

    // config: --config > QUERYDROP_CONFIG env > ./querydrop.toml
    let config_path = cli
        .config
        .or_else(|| std::env::var_os("QUERYDROP_CONFIG").map(PathBuf::from));
    // A broken config aborts each run, not the process.
    let settings = Settings::load(config_path.as_deref()).unwrap_or_else(|e| {
        error!("{e}, continuing with empty settings");
        Settings::default()
    });
    tracing::debug!(?settings, "settings extracted");

    let mode = if cli.once {
        info!("--once given, running a single export");
        ScheduleMode::SingleShot
    } else {
        ScheduleMode::from_settings(&settings)
    };

    let engine = SchedulerEngine::new(Arc::new(ExportJob::new(settings)), mode);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, stopping after the current run");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Keep the sender alive so the engine is not stopped by the drop.
                warn!("cannot listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        }
    });

    let runs = engine.run(shutdown_rx).await;
    info!(runs, "querydrop stopped");
    Ok(())
}
