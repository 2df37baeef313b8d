//! Catalog commands - categories, locations, highlights and the feed.

use anyhow::Result;
use clap::Args;

use super::{build_client, emit};
use crate::Cli;

/// Arguments for the locations command.
#[derive(Args, Default)]
pub struct LocationsArgs {
    /// Only the location the bar is at right now.
    #[arg(long, conflicts_with = "upcoming")]
    pub current: bool,

    /// Only locations that have not started yet.
    #[arg(long)]
    pub upcoming: bool,
}

/// Runs the categories command.
pub async fn run_categories(cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    let result = client.list_categories().await;
    emit(&result, cli, |f, categories| f.format_categories(categories))
}

/// Runs the locations command.
pub async fn run_locations(args: &LocationsArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;

    if args.current {
        let result = client.current_location().await;
        return emit(&result, cli, |f, location| match location {
            Some(location) => f.format_location(location),
            None => "The bar is not out right now.".to_string(),
        });
    }

    let result = if args.upcoming {
        client.upcoming_locations().await
    } else {
        client.list_locations().await
    };
    emit(&result, cli, |f, locations| f.format_locations(locations))
}

/// Runs the highlights command.
pub async fn run_highlights(cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    let result = client.list_highlights().await;
    emit(&result, cli, |f, highlights| f.format_highlights(highlights))
}

/// Runs the feed command.
pub async fn run_feed(cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    let result = client.social_feed().await;
    emit(&result, cli, |f, posts| f.format_feed(posts))
}
