//! CLI command implementations.

pub mod account;
pub mod catalog;
pub mod drinks;
pub mod health;
pub mod newsletter;

use anyhow::{Context, Result, bail};
use barkeep_api::BarClient;
use barkeep_core::UnifiedResult;
use barkeep_fetch::PolicySnapshot;
use barkeep_store::AppConfig;
use serde::Serialize;
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Builds a client from the environment and the global flags.
pub fn build_client(cli: &Cli) -> Result<BarClient> {
    let config = AppConfig::from_env().context("Invalid BARKEEP_* configuration")?;

    let policy = PolicySnapshot {
        prefer_edge: cli.prefer_edge,
        fallback_enabled: !cli.no_fallback,
        ..PolicySnapshot::default()
    };
    debug!(?policy, offline = !cli.offline_off, "Building client");

    let client = BarClient::builder(config)
        .offline(!cli.offline_off)
        .policy(policy)
        .build()?;
    Ok(client)
}

/// Prints `result` in the selected format.
///
/// Returns an error when the result is a failure, so the process exits
/// non-zero after the output is written.
pub fn emit<T, F>(result: &UnifiedResult<T>, cli: &Cli, render: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&TextFormatter, &T) -> String,
{
    match cli.format {
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(result)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if let Some(data) = result.data() {
                println!("{}", render(&formatter, data));
                if !cli.quiet {
                    if let Some(note) = formatter.format_provenance(result) {
                        println!("{note}");
                    }
                }
            }
        }
    }

    if !result.is_success() {
        bail!("{}", describe_failure(result));
    }
    Ok(())
}

/// One-line failure description with classification and diagnostic id.
pub fn describe_failure<T>(result: &UnifiedResult<T>) -> String {
    let mut message = result.error().unwrap_or("Request failed").to_string();
    if let Some(kind) = result.failure_kind() {
        message.push_str(&format!(" [{kind}]"));
    }
    if let Some(id) = result.diagnostic_id() {
        message.push_str(&format!(" (ray {id})"));
    }
    message
}
