use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use courier::cli::{Cli, Command};
use courier::config::CourierConfig;
use courier::delivery::{DeliveryController, DeliveryReport, FileInformation};
use courier::observer::{ObserverSet, TracingObserver};
use courier::transport::{HttpTransport, ScriptedTransport, Step, Transport};
use courier::ui::DeliveryProgress;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    courier::logging::init(cli.verbose);

    let mut config = CourierConfig::load(cli.config.as_deref())?;
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(unit) = cli.backoff_unit_ms {
        config.backoff_unit_ms = unit;
    }

    let report = match cli.command {
        Command::Send { endpoint, file } => {
            let payload = FileInformation::from_path(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let transport = HttpTransport::new(config.connect_timeout(), config.request_timeout())?;
            let endpoint = endpoint.unwrap_or_else(|| config.endpoint.clone());
            run(payload, transport, &config, endpoint).await?
        }
        Command::Demo {
            failures,
            hard_failure,
        } => {
            let last = if hard_failure {
                Step::HardFail(500)
            } else {
                Step::Succeed
            };
            let transport =
                ScriptedTransport::failing(failures, last).with_latency(Duration::from_millis(300));
            let payload = FileInformation::new("demo.txt", "Hello from courier");
            run(payload, transport, &config, config.endpoint.clone()).await?
        }
    };

    Ok(match report {
        Some(report) if report.succeeded() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// Deliver `payload` in its own task and wait for a terminal state or Ctrl-C.
async fn run<X: Transport + 'static>(
    payload: FileInformation,
    transport: X,
    config: &CourierConfig,
    endpoint: String,
) -> Result<Option<DeliveryReport>> {
    let progress = Arc::new(DeliveryProgress::start(&payload.name, config.max_retries));
    let observer = ObserverSet::new()
        .with(progress.clone())
        .with(Arc::new(TracingObserver));

    let controller =
        DeliveryController::new(payload, transport, config.retry_policy(), Arc::new(observer))?;
    let handle = controller.spawn(endpoint)?;

    tokio::select! {
        report = handle.wait() => {
            let report = report?;
            progress.print_report(&report);
            Ok(Some(report))
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted before the delivery reached a terminal state");
            Ok(None)
        }
    }
}
