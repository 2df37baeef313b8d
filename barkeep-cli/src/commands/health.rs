//! Health command - probe both tiers, optionally on a loop.

use anyhow::{Result, bail};
use barkeep_api::BarClient;
use barkeep_core::{HealthStatus, UnifiedResult};
use barkeep_fetch::{HealthSnapshot, PolicySnapshot};
use clap::Args;
use serde::Serialize;
use tokio::time::{Duration, interval};
use tracing::info;

use super::build_client;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Shortest allowed watch interval in seconds.
const MIN_INTERVAL_SECS: u64 = 5;

/// Arguments for the health command.
#[derive(Args)]
pub struct HealthArgs {
    /// Keep probing until interrupted.
    #[arg(long, short)]
    pub watch: bool,

    /// Seconds between probes in watch mode.
    #[arg(long, short, default_value = "30")]
    pub interval: u64,
}

/// Combined health report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Probe results per tier.
    pub snapshot: HealthSnapshot,
    /// The backend's own health answer.
    pub status: UnifiedResult<HealthStatus>,
    /// Routing policy after the probe.
    pub policy: PolicySnapshot,
}

/// Runs the health command.
pub async fn run(args: &HealthArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;

    if args.watch {
        return watch(&client, args.interval.max(MIN_INTERVAL_SECS), cli).await;
    }

    let report = probe(&client).await;
    print_report(&report, cli)?;

    if !report.snapshot.is_online() {
        bail!("Backend unreachable through every strategy");
    }
    Ok(())
}

async fn probe(client: &BarClient) -> HealthReport {
    let snapshot = client.check_health().await;
    let status = client.health().await;
    HealthReport {
        snapshot,
        status,
        policy: client.policy().snapshot(),
    }
}

fn print_report(report: &HealthReport, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(report)?),
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_health(&report.snapshot, report.status.data())
            );
        }
    }
    Ok(())
}

async fn watch(client: &BarClient, interval_secs: u64, cli: &Cli) -> Result<()> {
    info!(interval = interval_secs, "Starting health watch");

    let mut ticker = interval(Duration::from_secs(interval_secs));
    let formatter = TextFormatter::new(!cli.no_color);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping health watch");
                return Ok(());
            }
        }

        let report = probe(client).await;
        match cli.format {
            OutputFormat::Json => println!("{}", JsonFormatter::new(false).format(&report)?),
            OutputFormat::Text => println!("{}", formatter.format_health_line(&report.snapshot)),
        }
    }
}
