//! `tally ign` - display-name registry maintenance.

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_timestamp, print_table};
use tally::pipeline::Registry;
use anyhow::Result;
use clap::Subcommand;
use tally_protocol::PlayerId;

#[derive(Subcommand, Debug)]
pub enum IgnCommand {
    /// Record a player's in-game name (overwrites)
    Set {
        /// Chat user ID
        player: String,
        /// In-game name as it appears in the sheet
        name: String,
    },
    /// Show a player's in-game name
    Show { player: String },
    /// Remove a player's in-game name
    Reset { player: String },
    /// List every registered player
    List {
        #[arg(long)]
        json: bool,
    },
}

fn player_id(raw: &str) -> Result<PlayerId> {
    PlayerId::parse(raw).map_err(|_| HelpfulError::invalid_player_id(raw).into())
}

pub async fn run(registry: &dyn Registry, command: IgnCommand) -> Result<()> {
    match command {
        IgnCommand::Set { player, name } => {
            let player = player_id(&player)?;
            registry.set(&player, &name).await?;
            println!("IGN for {} has been set to: {}", player, name);
        }
        IgnCommand::Show { player } => {
            let player = player_id(&player)?;
            match registry.get(&player).await? {
                Some(name) => println!("{}: {}", player, name),
                None => println!("No IGN registered for {}", player),
            }
        }
        IgnCommand::Reset { player } => {
            let player = player_id(&player)?;
            if registry.remove(&player).await? {
                println!("IGN for {} has been reset", player);
            } else {
                println!("No IGN registered for {}", player);
            }
        }
        IgnCommand::List { json } => {
            let records = registry.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No players registered");
            } else {
                let rows = records
                    .into_iter()
                    .map(|r| {
                        vec![
                            r.display_name,
                            r.player_id.to_string(),
                            format_timestamp(&r.updated_at),
                        ]
                    })
                    .collect();
                print_table(&["IGN", "PLAYER", "UPDATED"], rows);
            }
        }
    }
    Ok(())
}
