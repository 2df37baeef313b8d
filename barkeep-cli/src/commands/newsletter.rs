//! Newsletter commands.

use anyhow::Result;
use clap::Args;

use super::{build_client, emit};
use crate::Cli;

/// Arguments for the subscribe and unsubscribe commands.
#[derive(Args)]
pub struct EmailArgs {
    /// Email address.
    pub email: String,
}

/// Runs the subscribe (or unsubscribe) command.
pub async fn run(args: &EmailArgs, subscribe: bool, cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    let result = if subscribe {
        client.subscribe_newsletter(&args.email).await
    } else {
        client.unsubscribe_newsletter(&args.email).await
    };
    emit(&result, cli, |f, response| f.format_newsletter(response))
}
