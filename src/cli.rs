//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fleetwatch - storage node fleet summary and version check
///
/// Polls every node dashboard in the registry, prints fleet totals and a
/// per-node table, or runs a Nagios-style version compliance check.
///
/// Examples:
///   fleetwatch --nodes /etc/storj-utils/nodes.json
///   fleetwatch --format json --output fleet.json
///   fleetwatch --check
///   fleetwatch --check --minimum-version 1.12.0
///   fleetwatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .fleetwatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON node registry ([{"name", "address", "port"}, ...])
    ///
    /// Defaults to /etc/storj-utils/nodes.json when present.
    #[arg(short, long, value_name = "FILE", env = "FLEETWATCH_NODES")]
    pub nodes: Option<PathBuf>,

    /// Per-node timeout in seconds, satellite calls included
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of nodes polled concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Run the version compliance check and exit with a Nagios status code
    ///
    /// 0 = OK, 2 = CRITICAL (a node is older than the minimum), 3 = UNKNOWN.
    #[arg(long)]
    pub check: bool,

    /// Required minimum version, instead of asking the version service
    #[arg(long, value_name = "VERSION")]
    pub minimum_version: Option<String>,

    /// Version service URL
    #[arg(long, value_name = "URL", env = "FLEETWATCH_VERSION_URL")]
    pub version_url: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not show the scan spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Generate a default .fleetwatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text tables (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("Concurrency must be at least 1".to_string());
            }
        }

        if let Some(ref url) = self.version_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Version URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref path) = self.nodes {
            if !path.is_file() {
                return Err(format!("Node registry not found: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// Check mode defaults to WARN so only the status line reaches the
    /// monitoring system.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else if self.check {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether the scan spinner should be drawn.
    pub fn show_progress(&self, format: OutputFormat) -> bool {
        !(self.quiet || self.no_progress || self.check || format == OutputFormat::Json)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            config: None,
            nodes: None,
            timeout: None,
            concurrency: None,
            format: None,
            output: None,
            check: false,
            minimum_version: None,
            version_url: None,
            verbose: false,
            quiet: false,
            no_progress: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "fleetwatch",
            "--check",
            "--timeout",
            "5",
            "--format",
            "json",
            "--minimum-version",
            "1.2.0",
        ])
        .unwrap();
        assert!(args.check);
        assert_eq!(args.timeout, Some(5));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.minimum_version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_version_url() {
        let mut args = make_args();
        args.version_url = Some("version.storj.io".to_string());
        assert!(args.validate().is_err());

        args.version_url = Some("https://version.storj.io".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_registry() {
        let mut args = make_args();
        args.nodes = Some(PathBuf::from("/nonexistent/nodes.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.check = true;
        assert_eq!(args.log_level(), tracing::Level::WARN);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_show_progress() {
        let mut args = make_args();
        assert!(args.show_progress(OutputFormat::Text));
        assert!(!args.show_progress(OutputFormat::Json));
        args.no_progress = true;
        assert!(!args.show_progress(OutputFormat::Text));
    }
}
