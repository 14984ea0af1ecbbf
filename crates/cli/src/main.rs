use capdns_domain::{CliOverrides, RegionTable};
use capdns_ingest::Dispatcher;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;

#[derive(Parser)]
#[command(name = "capdns")]
#[command(version)]
#[command(about = "capdns - bulk ingestion of captured DNS traffic into SQLite")]
struct Cli {
    /// Directory of pcap.<region>.<timestamp> capture files (repeatable)
    #[arg(short = 'd', long = "directory", value_name = "DIR", required = true)]
    directories: Vec<PathBuf>,

    /// Worker pool size (capped by the number of queued files)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Database path
    #[arg(long)]
    database: Option<String>,

    /// Region table path
    #[arg(long)]
    regions: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        workers: cli.workers,
        database_path: cli.database.clone(),
        regions_path: cli.regions.clone(),
        log_level: cli.log_level.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!("Starting capdns v{}", env!("CARGO_PKG_VERSION"));

    // Region table and datastore problems are fatal before any worker
    // spawns.
    let regions = RegionTable::load(std::path::Path::new(&config.ingest.regions_path))?;
    info!(
        regions = regions.len(),
        table = %config.ingest.regions_path,
        "Region table loaded"
    );

    let pool = bootstrap::init_database(&config.database).await?;
    // Schema only; every worker holds its own connection.
    pool.close().await;

    let mut dispatcher = Dispatcher::new(config, regions);
    let mut queued = 0;
    for dir in &cli.directories {
        queued += dispatcher.enqueue_directory(dir)?;
    }
    info!(queued, directories = cli.directories.len(), "Capture queue built");

    // First interrupt drains in-flight jobs and drops the queue; a second
    // one exits immediately.
    let interrupt = CancellationToken::new();
    {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt: finishing in-flight jobs, dropping the queue (interrupt again to force exit)");
                interrupt.cancel();
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Second interrupt, exiting now");
                std::process::exit(130);
            }
        });
    }

    let totals = dispatcher.run(interrupt).await;

    if totals.failed_jobs > 0 {
        error!(failed = totals.failed_jobs, "Run completed with failed jobs");
        std::process::exit(1);
    }
    Ok(())
}
