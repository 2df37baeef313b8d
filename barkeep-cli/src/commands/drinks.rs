//! Drink commands - list, show and search the menu.

use anyhow::Result;
use barkeep_core::{DrinkQuery, SortOrder};
use clap::Args;
use tracing::info;

use super::{build_client, emit};
use crate::Cli;

/// Arguments for the drinks command.
#[derive(Args, Default)]
pub struct DrinksArgs {
    /// Free-text filter on name and description.
    #[arg(long)]
    pub q: Option<String>,

    /// Category slug.
    #[arg(long, short)]
    pub category: Option<String>,

    /// Page number, starting at 1.
    #[arg(long, short)]
    pub page: Option<u32>,

    /// Drinks per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Only active (or only inactive) drinks.
    #[arg(long)]
    pub active: Option<bool>,

    /// Field to sort by (name, price, sortOrder).
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort direction (asc or desc).
    #[arg(long)]
    pub sort_order: Option<SortOrder>,
}

impl DrinksArgs {
    fn to_query(&self) -> DrinkQuery {
        DrinkQuery {
            q: self.q.clone(),
            category: self.category.clone(),
            page: self.page,
            page_size: self.page_size,
            is_active: self.active,
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
        }
    }
}

/// Arguments for the drink command.
#[derive(Args)]
pub struct DrinkArgs {
    /// Drink id.
    pub id: u64,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for.
    pub text: String,

    /// Page number, starting at 1.
    #[arg(long, short)]
    pub page: Option<u32>,
}

/// Runs the drinks command.
pub async fn run_list(args: &DrinksArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    let query = args.to_query();

    info!(pairs = ?query.to_pairs(), "Listing drinks");
    let result = client.list_drinks(&query).await;
    emit(&result, cli, |f, page| f.format_drink_page(page))
}

/// Runs the drink command.
pub async fn run_show(args: &DrinkArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    let result = client.get_drink(args.id).await;
    emit(&result, cli, |f, drink| f.format_drink(drink))
}

/// Runs the search command.
pub async fn run_search(args: &SearchArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;

    let result = match args.page {
        Some(page) => {
            let query = DrinkQuery {
                page: Some(page),
                ..DrinkQuery::new().search(&args.text)
            };
            client.list_drinks(&query).await
        }
        None => client.search_drinks(&args.text).await,
    };
    emit(&result, cli, |f, page| f.format_drink_page(page))
}
