// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Barkeep CLI - the mobile bar's content backend from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Is the backend reachable, and through which tier?
//! barkeep health
//!
//! # Drink menu, filtered and paged
//! barkeep drinks --q Apfel --page 1 --page-size 10
//!
//! # JSON output
//! barkeep categories --format json --pretty
//!
//! # Start at the edge tier, never fall back to offline data
//! barkeep locations --current --prefer-edge --offline-off
//!
//! # Watch reachability
//! barkeep health --watch --interval 30
//! ```

mod commands;
mod output;

use anyhow::Result;
use barkeep_store::AppConfig;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{account, catalog, drinks, health, newsletter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Barkeep CLI - content backend client for the mobile bar.
#[derive(Parser)]
#[command(name = "barkeep")]
#[command(about = "Content backend client for the mobile bar")]
#[command(long_about = r"
Barkeep reads the mobile bar's drinks, locations and highlights from the
content backend. Requests that the edge proxy blocks are retried with
browser-like, minimal and HTTP/1.1 transports. When every strategy
fails, read commands answer from a bundled offline dataset.

Configuration comes from BARKEEP_* environment variables:
  BARKEEP_API_URL, BARKEEP_API_TOKEN, BARKEEP_SITE_ORIGIN, BARKEEP_DEBUG,
  BARKEEP_ENV, BARKEEP_TIMEOUT_SECS, BARKEEP_RATE_LIMIT_BACKOFF_MS,
  BARKEEP_HEALTH_INTERVAL_SECS

Examples:
  barkeep health                 # Probe both tiers
  barkeep drinks --q Apfel       # Search the menu
  barkeep locations --upcoming   # Where the bar goes next
  barkeep --format json feed     # JSON output
")]
#[command(version)]
#[command(author = "Barkeep Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Start with the edge-optimized tier.
    #[arg(long, global = true)]
    pub prefer_edge: bool,

    /// Stop after the first tier fails.
    #[arg(long, global = true)]
    pub no_fallback: bool,

    /// Never answer from the offline dataset.
    #[arg(long, global = true)]
    pub offline_off: bool,

    /// Verbose output (show debug info). `BARKEEP_DEBUG` has the same effect.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Probe the backend through both tiers.
    #[command(visible_alias = "h")]
    Health(health::HealthArgs),

    /// List drinks.
    #[command(visible_alias = "d")]
    Drinks(drinks::DrinksArgs),

    /// Show one drink.
    Drink(drinks::DrinkArgs),

    /// Search drinks by name or description.
    #[command(visible_alias = "s")]
    Search(drinks::SearchArgs),

    /// List drink categories.
    #[command(visible_alias = "c")]
    Categories,

    /// List locations.
    #[command(visible_alias = "l")]
    Locations(catalog::LocationsArgs),

    /// List highlights.
    Highlights,

    /// Show the social media feed.
    Feed,

    /// Log in and store the session token.
    Login(account::LoginArgs),

    /// Forget the stored session token.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Subscribe to the newsletter.
    Subscribe(newsletter::EmailArgs),

    /// Unsubscribe from the newsletter.
    Unsubscribe(newsletter::EmailArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// Any failure.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Debug logging is on with `--verbose` or a truthy `BARKEEP_DEBUG`.
fn debug_requested(verbose: bool, config: Option<&AppConfig>) -> bool {
    verbose || config.is_some_and(|c| c.debug)
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("barkeep=debug,info")
    } else {
        EnvFilter::new("barkeep=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config errors surface later through `build_client`.
    let config = AppConfig::from_env().ok();
    setup_logging(debug_requested(cli.verbose, config.as_ref()), cli.quiet);

    let result = match &cli.command {
        Commands::Health(args) => health::run(args, &cli).await,
        Commands::Drinks(args) => drinks::run_list(args, &cli).await,
        Commands::Drink(args) => drinks::run_show(args, &cli).await,
        Commands::Search(args) => drinks::run_search(args, &cli).await,
        Commands::Categories => catalog::run_categories(&cli).await,
        Commands::Locations(args) => catalog::run_locations(args, &cli).await,
        Commands::Highlights => catalog::run_highlights(&cli).await,
        Commands::Feed => catalog::run_feed(&cli).await,
        Commands::Login(args) => account::run_login(args, &cli).await,
        Commands::Logout => account::run_logout(&cli).await,
        Commands::Whoami => account::run_whoami(&cli).await,
        Commands::Subscribe(args) => newsletter::run(args, true, &cli).await,
        Commands::Unsubscribe(args) => newsletter::run(args, false, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}
