//! Login command - add an account through a QR login.

use anyhow::{bail, Result};
use clap::Args;
use hoyosign_domain::{parse_game_list, LoginProgress, StageOutcome};

use super::{ctrl_c_token, Context};

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Display name for the account (defaults to the first role's nickname)
    #[arg(long)]
    pub name: Option<String>,

    /// Games to claim for, comma separated (genshin,starrail,zzz)
    #[arg(long)]
    pub games: Option<String>,
}

/// Run the login command.
pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    // Validate before the user scans anything
    let games = args.games.as_deref().map(parse_game_list).transpose()?;
    if games.as_ref().is_some_and(Vec::is_empty) {
        bail!("--games needs at least one game");
    }

    let session = ctx.exchange.request_qr().await?;
    println!("Open this link as a QR code and scan it with the miHoYo app:");
    println!();
    println!("  {}", session.url);
    println!();
    println!("Waiting for confirmation (Ctrl-C to cancel)...");

    let cancel = ctrl_c_token();
    let sink = |progress: &LoginProgress| println!("  {progress}");
    let outcome = ctx.exchange.login(&session, &sink, &cancel).await?;

    if let StageOutcome::Failed(reason) = &outcome.cookie_token {
        println!("warning: cookie token unavailable ({reason})");
    }
    if let StageOutcome::Failed(reason) = &outcome.long_token {
        println!("warning: long token unavailable ({reason})");
    }

    let mut account = ctx.accounts.register_login(&outcome).await?;
    if let Some(name) = args.name.as_deref() {
        account = ctx.accounts.rename(&account.id, name).await?;
    }
    if let Some(games) = games.as_deref() {
        account = ctx.accounts.set_games(&account.id, games).await?;
    }

    println!("Saved account {} ({})", account.name, account.id);
    Ok(())
}
