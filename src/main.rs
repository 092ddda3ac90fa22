mod tui;

use std::{fs::File, sync::Mutex};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use surfacewatch::{
    config::Config,
    core::{HttpScanService, SubmitState, Submitter},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config)?;

    let service = HttpScanService::new(&config.service_url, config.timeout())
        .context("failed to set up scanning service client")?;

    match config.target.clone() {
        Some(target) => run_headless(&config, &service, &target).await,
        None => tui::run(config, service).await,
    }
}

/// stderr in headless mode; the dashboard only logs to `--log-file`.
fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    if config.headless() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else if let Some(path) = &config.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    Ok(())
}

async fn run_headless(config: &Config, service: &HttpScanService, target: &str) -> Result<()> {
    let mut submitter = Submitter::new();
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let state = submitter
        .submit(service, target, &config.ports, config.timeout(), &cancel)
        .await?;

    match state {
        SubmitState::Succeeded { view, meta } => {
            if config.json {
                println!("{}", serde_json::to_string_pretty(view.as_ref())?);
            } else {
                print!("{}", tui::report_text(view, meta));
            }
            Ok(())
        }
        SubmitState::Failed { error, .. } => bail!("{error}"),
        other => bail!("scan ended in unexpected state {}", other.label()),
    }
}
