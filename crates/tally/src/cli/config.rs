//! `tally config` - show resolved configuration and paths.

use crate::cli::context::CliContext;
use tally_protocol::paths::{default_logs_dir, tally_home};

#[derive(Debug)]
pub struct ConfigArgs {
    pub json: bool,
}

pub fn run(ctx: &CliContext, args: ConfigArgs) -> anyhow::Result<()> {
    let config = &ctx.config;
    let home = tally_home();
    let logs = default_logs_dir();

    if args.json {
        let value = serde_json::json!({
            "home": home,
            "config_path": ctx.config_path,
            "config_found": ctx.config_found,
            "logs_dir": logs,
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("TALLY CONFIGURATION");
    println!("===================");
    println!();
    println!("Home:     {}", home.display());
    println!(
        "Config:   {}{}",
        ctx.config_path.display(),
        if ctx.config_found { "" } else { " (not found, using defaults)" }
    );
    println!("Logs:     {}", logs.display());
    println!();
    println!("Registry: {}", config.registry.database_path.display());
    println!();
    println!("Review timeout:   {}s", config.review.timeout_secs);
    println!("Tombstones kept:  {}s", config.review.retention_secs);
    if config.review.adjudicators.is_empty() {
        println!("Adjudicators:     (none)");
    } else {
        println!("Adjudicators:     {}", config.review.adjudicators.join(", "));
    }
    println!();
    println!(
        "OCR:      {} -l {} (max {}x{})",
        config.ocr.tesseract_path.display(),
        config.ocr.language,
        config.ocr.max_width,
        config.ocr.max_height
    );
    println!();
    let spreadsheet = if config.ledger.spreadsheet_id.is_empty() {
        "(not set)"
    } else {
        config.ledger.spreadsheet_id.as_str()
    };
    println!("Ledger:   {} {}", spreadsheet, config.ledger.range);
    let token_state = if std::env::var(&config.ledger.token_env).is_ok() {
        "set"
    } else {
        "missing"
    };
    println!("Token:    ${} ({})", config.ledger.token_env, token_state);
    Ok(())
}
