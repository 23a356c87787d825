//! Tally launcher
//!
//! - `run`: verification pipeline over a JSON-lines gateway (stdin/stdout)
//! - `extract`: one-off extraction from a local screenshot
//! - `ign`, `ledger`, `config`: maintenance utilities

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tally_logging::{init_logging, LogConfig};

mod cli;

use cli::context::CliContext;
use cli::ign::IgnCommand;
use cli::ledger::LedgerCommand;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Screenshot growth-rate verification")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Registry database (overrides [registry].database_path)
    #[arg(long, global = true, env = "TALLY_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline: events on stdin, surface operations on stdout
    Run {
        /// Seconds a review card stays clickable
        #[arg(long, env = "TALLY_REVIEW_TIMEOUT_SECS")]
        timeout_secs: Option<u64>,

        /// Player ID allowed to verify/reject (repeatable)
        #[arg(long = "adjudicator")]
        adjudicators: Vec<String>,

        /// Keep ledger writes in memory (dry run)
        #[arg(long)]
        memory_ledger: bool,
    },

    /// Extract the growth rate from a screenshot
    Extract {
        image: PathBuf,

        /// Also print the recognized text
        #[arg(long)]
        text: bool,

        #[arg(long)]
        json: bool,
    },

    /// Manage registered in-game names
    Ign {
        #[command(subcommand)]
        command: IgnCommand,
    },

    /// Write to the ledger directly
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },

    /// Show resolved configuration
    Config {
        #[arg(long)]
        json: bool,
    },
}

/// Commands whose stdout is machine-readable; console logging stays quiet.
fn command_wants_json(cmd: &Commands) -> bool {
    match cmd {
        Commands::Run { .. } => true,
        Commands::Extract { json, .. } => *json,
        Commands::Ign {
            command: IgnCommand::List { json },
        } => *json,
        Commands::Ign { .. } => false,
        Commands::Ledger {
            command: LedgerCommand::Upsert { json, .. },
        } => *json,
        Commands::Config { json } => *json,
    }
}

async fn run_command(cli: Cli) -> Result<()> {
    let ctx = CliContext::load(cli.config.as_deref(), cli.database.as_deref())?;
    match cli.command {
        Commands::Run {
            timeout_secs,
            adjudicators,
            memory_ledger,
        } => {
            cli::run::run(
                &ctx,
                cli::run::RunArgs {
                    timeout_secs,
                    adjudicators,
                    memory_ledger,
                },
            )
            .await
        }
        Commands::Extract { image, text, json } => {
            cli::extract::run(&ctx, cli::extract::ExtractArgs { image, text, json }).await
        }
        Commands::Ign { command } => {
            let registry = ctx.open_registry().await?;
            let result = cli::ign::run(&registry, command).await;
            registry.close().await;
            result
        }
        Commands::Ledger { command } => cli::ledger::run(&ctx, command).await,
        Commands::Config { json } => cli::config::run(&ctx, cli::config::ConfigArgs { json }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let _log_guard = match init_logging(LogConfig {
        app_name: "tally",
        verbose: cli.verbose,
        quiet_console: json_mode || !cli.verbose,
        log_dir: None,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run_command(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
