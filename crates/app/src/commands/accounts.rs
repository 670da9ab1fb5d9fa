//! Accounts command - list and maintain stored accounts.

use anyhow::Result;
use clap::{Args, Subcommand};
use hoyosign_domain::{parse_game_list, Account};
use serde_json::json;

use super::{format_local, Context};

/// Arguments for the accounts command.
#[derive(Args, Debug)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub command: AccountsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountsCommand {
    /// List stored accounts
    List,

    /// Delete an account
    Remove {
        /// Account id
        id: String,
    },

    /// Include an account in claim runs
    Enable {
        /// Account id
        id: String,
    },

    /// Exclude an account from claim runs
    Disable {
        /// Account id
        id: String,
    },

    /// Set the games claimed for an account
    Games {
        /// Account id
        id: String,
        /// Comma separated list (genshin,starrail,zzz)
        games: String,
    },

    /// Change an account's display name
    Rename {
        /// Account id
        id: String,
        /// New display name
        name: String,
    },

    /// Add an account from a cookie string captured in a browser
    Import {
        /// Cookie string (`stuid=...; stoken=...; ...`)
        cookie: String,
    },
}

/// Run the accounts command.
pub async fn run(args: AccountsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AccountsCommand::List => cmd_list(ctx).await,
        AccountsCommand::Remove { id } => {
            ctx.accounts.remove(&id).await?;
            println!("Removed account {id}");
            Ok(())
        }
        AccountsCommand::Enable { id } => {
            let account = ctx.accounts.set_active(&id, true).await?;
            println!("Enabled {}", label(&account));
            Ok(())
        }
        AccountsCommand::Disable { id } => {
            let account = ctx.accounts.set_active(&id, false).await?;
            println!("Disabled {}", label(&account));
            Ok(())
        }
        AccountsCommand::Games { id, games } => {
            let games = parse_game_list(&games)?;
            let account = ctx.accounts.set_games(&id, &games).await?;
            println!("{} now claims: {}", label(&account), game_names(&account));
            Ok(())
        }
        AccountsCommand::Rename { id, name } => {
            let account = ctx.accounts.rename(&id, &name).await?;
            println!("Renamed to {}", label(&account));
            Ok(())
        }
        AccountsCommand::Import { cookie } => {
            let account = ctx.accounts.import_credential(&cookie).await?;
            println!("Saved account {}", label(&account));
            Ok(())
        }
    }
}

async fn cmd_list(ctx: &Context) -> Result<()> {
    let accounts = ctx.accounts.list().await?;

    if ctx.json_output {
        // Credentials stay out of the output
        let rows: Vec<_> = accounts
            .iter()
            .map(|a| {
                json!({
                    "id": a.id,
                    "name": a.name,
                    "active": a.active,
                    "games": a.enabled_games,
                    "created_at": a.created_at,
                    "last_claim_at": a.last_claim_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("No accounts. Add one with `hoyosign login`.");
        return Ok(());
    }

    for account in &accounts {
        let state = if account.active { "active" } else { "paused" };
        let last = account.last_claim_at.as_ref().map_or_else(|| "never".to_string(), format_local);
        println!("{}  [{state}]", label(account));
        println!("    games: {}", game_names(account));
        println!("    last claim: {last}");
    }
    Ok(())
}

fn label(account: &Account) -> String {
    format!("{} ({})", account.name, account.id)
}

fn game_names(account: &Account) -> String {
    account.enabled_games.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
