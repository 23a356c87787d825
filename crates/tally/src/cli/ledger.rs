//! `tally ledger` - manual ledger writes.

use crate::cli::context::CliContext;
use crate::cli::error::HelpfulError;
use anyhow::Result;
use clap::Subcommand;
use std::sync::Arc;
use tally_protocol::format_grouped;
use tally_sheets::{LedgerError, LedgerSync, SheetsClient};

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Set the value for an in-game name (the same write a Verify performs)
    Upsert {
        /// In-game name (first column)
        key: String,
        /// Growth rate, digits only
        value: u64,
        #[arg(long)]
        json: bool,
    },
}

/// Build the Sheets client, turning config gaps into actionable errors.
pub fn sheets_client(ctx: &CliContext) -> Result<SheetsClient> {
    SheetsClient::from_config(&ctx.config.ledger).map_err(|e| match e {
        LedgerError::NotConfigured(_) => HelpfulError::ledger_not_configured(&ctx.config_path).into(),
        LedgerError::MissingToken(var) => HelpfulError::missing_token(&var).into(),
        other => anyhow::Error::new(other),
    })
}

pub async fn run(ctx: &CliContext, command: LedgerCommand) -> Result<()> {
    match command {
        LedgerCommand::Upsert { key, value, json } => {
            let sync = LedgerSync::new(Arc::new(sheets_client(ctx)?));
            let action = sync.upsert(&key, value).await?;
            if json {
                let out = serde_json::json!({
                    "key": key,
                    "value": value,
                    "result": action,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}: {} ({})", key, format_grouped(value), action);
            }
        }
    }
    Ok(())
}
