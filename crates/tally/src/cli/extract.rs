//! `tally extract <image>` - run the extractor on a local file.

use crate::cli::context::CliContext;
use crate::cli::error::HelpfulError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tally_extract::ValueExtractor;

#[derive(Debug)]
pub struct ExtractArgs {
    pub image: PathBuf,
    /// Print the raw recognized text as well.
    pub text: bool,
    pub json: bool,
}

pub async fn run(ctx: &CliContext, args: ExtractArgs) -> Result<()> {
    if !args.image.exists() {
        return Err(HelpfulError::file_not_found(&args.image).into());
    }
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    let extractor = ValueExtractor::from_config(&ctx.config.ocr)?;
    let raw_text = extractor
        .recognize_text(&bytes)
        .await
        .with_context(|| format!("Failed to process {}", args.image.display()))?;
    let reading = extractor.parse_text(&raw_text);

    if args.json {
        let value = serde_json::json!({
            "image": args.image,
            "found": reading.is_some(),
            "value": reading.as_ref().map(|r| r.value),
            "formatted": reading.as_ref().map(|r| r.formatted.clone()),
            "raw_text": if args.text { Some(raw_text.as_str()) } else { None },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match &reading {
        Some(r) => println!("Growth Rate: {} ({})", r.formatted, r.value),
        None => println!("No growth rate found in {}", args.image.display()),
    }
    if args.text {
        println!();
        println!("--- recognized text ---");
        println!("{}", raw_text.trim_end());
    }
    Ok(())
}
