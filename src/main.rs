//! Fleetwatch - storage node fleet summary and version check
//!
//! Polls the dashboard API of every node in the registry, aggregates
//! disk, bandwidth and satellite telemetry, and checks the oldest running
//! version against the published minimum.
//!
//! Exit codes (summary mode):
//!   0 - Report produced
//!   1 - Runtime error (configuration, output, cancelled scan)
//!
//! Exit codes (--check, Nagios plugin convention):
//!   0 - OK, 1 - WARNING, 2 - CRITICAL, 3 - UNKNOWN

mod analysis;
mod cli;
mod client;
mod compliance;
mod config;
mod error;
mod models;
mod poller;
mod registry;
mod report;
mod version;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use client::{build_http_client, NodeClient, VersionSource};
use config::Config;
use error::VersionSourceError;
use indicatif::{ProgressBar, ProgressStyle};
use models::{HealthState, NodeEndpoint, NodeSnapshot};
use poller::{FleetScanner, ScanOptions};
use report::FleetReport;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(failure_code(&args));
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Fleetwatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let exit_code = if args.check {
        run_check(&args).await
    } else {
        match run_summary(&args).await {
            Ok(()) => 0,
            Err(e) => {
                error!("Summary failed: {:#}", e);
                eprintln!("\n❌ Error: {:#}", e);
                failure_code(&args)
            }
        }
    };

    std::process::exit(exit_code);
}

/// Exit code for failures outside the fleet evaluation itself.
fn failure_code(args: &Args) -> i32 {
    if args.check {
        HealthState::Unknown.exit_code()
    } else {
        1
    }
}

/// Handle --init-config: generate a default .fleetwatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .fleetwatch.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .fleetwatch.toml")?;

    println!("✅ Created .fleetwatch.toml with default settings.");
    println!("   Add your nodes under [[nodes]] or point [registry] at a nodes.json file.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout carries the report or check status line.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Everything needed to poll the fleet.
struct Fleet {
    config: Config,
    endpoints: Vec<NodeEndpoint>,
    http: reqwest::Client,
}

fn prepare(args: &Args) -> Result<Fleet> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let endpoints = registry::build_fleet(&config)?;
    let http = build_http_client()?;

    Ok(Fleet {
        config,
        endpoints,
        http,
    })
}

impl Fleet {
    fn scanner(&self) -> FleetScanner {
        let client = NodeClient::new(self.http.clone(), self.config.polling.satellite_concurrency);
        FleetScanner::new(
            client,
            ScanOptions {
                timeout: self.config.polling.timeout(),
                concurrency: self.config.polling.concurrency,
            },
        )
    }

    /// Scan every node, abandoning the scan on Ctrl-C.
    async fn scan(&self, show_progress: bool) -> Result<Vec<NodeSnapshot>> {
        let spinner = show_progress.then(|| scan_spinner(self.endpoints.len()));

        let result = self
            .scanner()
            .scan_until(&self.endpoints, shutdown_signal())
            .await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        Ok(result?)
    }

    /// Configured minimum, or the one published by the version service.
    async fn minimum_version(&self) -> Result<String, VersionSourceError> {
        if let Some(ref minimum) = self.config.version.minimum {
            debug!("Using configured minimum version {}", minimum);
            return Ok(minimum.clone());
        }

        VersionSource::new(self.http.clone(), self.config.version.url.clone())
            .fetch_minimum(self.config.polling.timeout())
            .await
    }
}

/// Poll the fleet and write the summary report.
async fn run_summary(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let fleet = prepare(args)?;
    let format = fleet.config.general.format;

    let snapshots = fleet.scan(args.show_progress(format)).await?;

    // The summary only carries a version check when a minimum is pinned.
    let compliance = match fleet.config.version.minimum {
        Some(_) => Some(compliance::evaluate_fleet(&fleet.minimum_version().await, &snapshots)),
        None => None,
    };

    let report = FleetReport::build(&snapshots, Utc::now(), compliance);

    let output = match format {
        OutputFormat::Json => report::render_json(&report)?,
        OutputFormat::Text => report::render_text(&report),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    debug!("Summary finished in {:.1}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Run the version compliance check. Returns the Nagios exit code.
async fn run_check(args: &Args) -> i32 {
    let fleet = match prepare(args) {
        Ok(fleet) => fleet,
        Err(e) => {
            println!("{}: {:#}", HealthState::Unknown, e);
            return HealthState::Unknown.exit_code();
        }
    };

    let (minimum, scan) = tokio::join!(fleet.minimum_version(), fleet.scan(false));

    let snapshots = match scan {
        Ok(snapshots) => snapshots,
        Err(e) => {
            println!("{}: {:#}", HealthState::Unknown, e);
            return HealthState::Unknown.exit_code();
        }
    };

    if let Err(ref e) = minimum {
        warn!("{}", e);
    }

    let verdict = compliance::evaluate_fleet(&minimum, &snapshots);
    println!("{}: {}", verdict.state, verdict.message());
    verdict.state.exit_code()
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

fn scan_spinner(nodes: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Polling {} nodes...", nodes));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
