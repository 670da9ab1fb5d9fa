//! Claim command - manual claim run.

use anyhow::{bail, Result};
use clap::Args;
use hoyosign_domain::GameId;

use super::{print_run, Context};

/// Arguments for the claim command.
#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Only this account
    #[arg(long)]
    pub account: Option<String>,

    /// Only this game (genshin, starrail or zzz)
    #[arg(long)]
    pub game: Option<String>,
}

/// Run the claim command.
pub async fn run(args: ClaimArgs, ctx: &Context) -> Result<()> {
    let game: Option<GameId> = args.game.as_deref().map(str::parse).transpose()?;
    let games = game.map(|g| vec![g]);

    if let Some(id) = args.account.as_deref() {
        let account = ctx.accounts.get(id).await?;
        print_run(&ctx.orchestrator.run_account(&account, games.as_deref()).await);
        return Ok(());
    }

    let summary = match games.as_deref() {
        Some(games) => {
            let accounts = ctx.accounts.list().await?;
            ctx.orchestrator.run_accounts(accounts, Some(games)).await
        }
        None => ctx.orchestrator.run_all().await?,
    };
    if summary.runs.is_empty() {
        bail!("no active accounts");
    }
    for run in &summary.runs {
        print_run(run);
    }
    println!();
    println!(
        "{} accounts, {} claims succeeded, {} failed",
        summary.accounts(),
        summary.claims_succeeded(),
        summary.claims_failed() + summary.accounts_failed()
    );
    Ok(())
}
