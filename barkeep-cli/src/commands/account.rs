//! Account commands - login, logout and whoami.

use anyhow::{Result, bail};
use clap::Args;
use tracing::info;

use super::{build_client, emit};
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Account email.
    #[arg(long, short)]
    pub email: String,

    /// Account password.
    #[arg(long, short, env = "BARKEEP_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Runs the login command.
pub async fn run_login(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    let result = client.login(&args.email, &args.password).await;
    emit(&result, cli, |f, response| f.format_login(response))
}

/// Runs the logout command.
pub async fn run_logout(cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;
    client.logout().await?;

    info!("Session token removed");
    if cli.format == OutputFormat::Json {
        println!(r#"{{"success":true}}"#);
    } else if !cli.quiet {
        println!("Logged out.");
    }
    Ok(())
}

/// Runs the whoami command.
pub async fn run_whoami(cli: &Cli) -> Result<()> {
    let client = build_client(cli)?;

    if !client.is_authenticated().await {
        bail!("Not logged in. Run `barkeep login` first.");
    }

    let claims = client.session().await;
    let result = client.current_user().await;
    emit(&result, cli, |f, user| f.format_user(user, claims.as_ref()))
}
