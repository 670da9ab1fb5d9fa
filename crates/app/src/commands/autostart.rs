//! Autostart command - start the daemon with the desktop session.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the autostart command.
#[derive(Args, Debug)]
pub struct AutostartArgs {
    #[command(subcommand)]
    pub command: AutostartCommand,
}

#[derive(Subcommand, Debug)]
pub enum AutostartCommand {
    /// Show whether autostart is registered
    Status,
    /// Register `hoyosign daemon` to start at login
    Enable,
    /// Remove the registration
    Disable,
}

/// Run the autostart command.
pub fn run(args: AutostartArgs, _ctx: &Context) -> Result<()> {
    let registrar = hoyosign_infra::autostart_registrar()?;

    match args.command {
        AutostartCommand::Status => {
            let state = if registrar.is_enabled()? { "enabled" } else { "disabled" };
            println!("Autostart {state}");
        }
        AutostartCommand::Enable => {
            registrar.enable()?;
            println!("Autostart enabled");
        }
        AutostartCommand::Disable => {
            registrar.disable()?;
            println!("Autostart disabled");
        }
    }
    Ok(())
}
