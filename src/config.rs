use std::{path::PathBuf, time::Duration};

use clap::Parser;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// surfacewatch: attack surface dashboard for a remote scanning service
#[derive(Parser, Debug, Clone)]
#[command(name = "surfacewatch", version, about = "Submit scans and browse the results")]
pub struct Config {
    /// Base URL of the scanning service
    #[arg(long, env = "SURFACEWATCH_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Give up on a scan after this many seconds
    #[arg(
        long = "timeout-secs",
        env = "SURFACEWATCH_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Run one scan without the dashboard: IP address or domain
    #[arg(short, long, value_name = "TARGET")]
    pub target: Option<String>,

    /// Ports for --target: range (1-1000), list (22,80,443) or preset name
    #[arg(short = 'p', long = "ports", value_name = "PORTS", default_value = "common")]
    pub ports: String,

    /// Print the derived view model as JSON (with --target)
    #[arg(long, requires = "target")]
    pub json: bool,

    /// Write dashboard logs to this file
    #[arg(long, value_name = "PATH", env = "SURFACEWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity level (use -v or -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn headless(&self) -> bool {
        self.target.is_some()
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
