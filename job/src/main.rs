use anyhow::{Context, Result};
use clap::Parser;
use exectime_job::{
    config::{Config, OrderPolicy},
    db::Database,
    feed::HttpFeed,
    logging,
    pipeline::{Pipeline, Settings},
    status::{StatusLog, TracingStatus},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "exectime-job")]
#[command(version)]
#[command(about = "Merge the execution-time snapshot into the stored dataset and flag anomalies", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Compute and print the labelled dataset as JSON without writing it
    #[arg(long)]
    dry_run: bool,

    /// Override the order the baseline pass walks the merged records in
    #[arg(long, value_enum)]
    order: Option<OrderPolicy>,
}

/// Explicit paths must load; the default path falls back to defaults.
fn load_config(cli: &Cli) -> Result<(Config, Option<String>)> {
    if let Some(path) = &cli.config {
        return Ok((Config::load(path)?, None));
    }

    let path = Config::config_path();
    if !path.exists() {
        return Ok((Config::default(), Some("No config file found, using defaults".to_string())));
    }
    match Config::load(&path) {
        Ok(config) => Ok((config, None)),
        Err(e) => Ok((
            Config::default(),
            Some(format!("Failed to load config: {e:#}, using defaults")),
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, note) = load_config(&cli)?;
    if let Some(order) = cli.order {
        config.baseline.order = order;
    }
    config.validate()?;

    let _guard = logging::init(&config.logging);
    if let Some(note) = note {
        warn!("{}", note);
    }
    info!(
        database = %config.database.path.display(),
        endpoint = %config.feed.endpoint,
        order = ?config.baseline.order,
        "exectime-job starting"
    );

    let db = Database::open(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path.display()))?;
    db.init_schema().context("initializing schema")?;

    let feed = HttpFeed::from_config(&config.feed)?;
    let status: Arc<dyn StatusLog> = Arc::new(TracingStatus);
    let mut pipeline = Pipeline::new(db, feed, status, Settings::from_config(&config.baseline));

    if cli.dry_run {
        let processed = pipeline.process().await?;
        println!("{}", serde_json::to_string_pretty(&processed.records)?);
        info!(summary = ?processed.summary, "Dry run, nothing written");
    } else {
        let summary = pipeline.run().await?;
        info!(
            stored = summary.stored,
            fetched = summary.fetched,
            appended = summary.appended,
            refreshed = summary.refreshed,
            anomalies = summary.anomalies,
            "Run finished"
        );
    }

    Ok(())
}
