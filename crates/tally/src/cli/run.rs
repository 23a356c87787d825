//! `tally run` - serve the pipeline over the JSON-lines gateway.

use crate::cli::context::CliContext;
use crate::cli::ledger::sheets_client;
use tally::gateway::{ConsoleSurface, Gateway, JsonLineWriter};
use tally::pipeline::{PipelineCoordinator, PipelineSettings, StaticPermissions};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tally_extract::ValueExtractor;
use tally_protocol::PlayerId;
use tally_sheets::{LedgerClient, LedgerSync, MemoryLedger};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Bound on events queued ahead of the pipeline.
const EVENT_QUEUE_DEPTH: usize = 64;

#[derive(Debug)]
pub struct RunArgs {
    pub timeout_secs: Option<u64>,
    /// Added to `[review] adjudicators`.
    pub adjudicators: Vec<String>,
    /// Keep the ledger in memory instead of writing to Google Sheets.
    pub memory_ledger: bool,
}

pub async fn run(ctx: &CliContext, args: RunArgs) -> Result<()> {
    let config = &ctx.config;

    let mut settings = PipelineSettings::from(&config.review);
    if let Some(secs) = args.timeout_secs {
        settings.review_timeout = Duration::from_secs(secs);
    }

    let mut adjudicators = config.review.adjudicator_ids()?;
    for raw in &args.adjudicators {
        adjudicators.push(
            PlayerId::parse(raw).with_context(|| format!("Invalid --adjudicator '{}'", raw))?,
        );
    }
    let permissions = StaticPermissions::new(adjudicators);
    if permissions.is_empty() {
        warn!("no adjudicators configured; every Verify/Reject will be refused");
    }

    let ledger_client: Arc<dyn LedgerClient> = if args.memory_ledger {
        Arc::new(MemoryLedger::new())
    } else {
        Arc::new(sheets_client(ctx)?)
    };

    let registry = ctx.open_registry().await?;
    let extractor = ValueExtractor::from_config(&config.ocr)?;

    let writer = Arc::new(JsonLineWriter::new(tokio::io::stdout()));
    let coordinator = PipelineCoordinator::new(
        extractor,
        Arc::new(ConsoleSurface::new(writer.clone())),
        Arc::new(permissions),
        Arc::new(registry.clone()),
        LedgerSync::new(ledger_client),
        settings,
    );

    info!(
        timeout_secs = settings.review_timeout.as_secs(),
        memory_ledger = args.memory_ledger,
        "tally pipeline started"
    );

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let pipeline = tokio::spawn(coordinator.clone().run(rx));

    let stats = Gateway::new(writer, tx)
        .pump(BufReader::new(tokio::io::stdin()))
        .await?;
    pipeline.await.context("Pipeline task failed")?;

    let pending = coordinator.pending_sessions();
    if pending > 0 {
        warn!(pending, "input closed with sessions still awaiting review");
    }
    info!(
        images = stats.images,
        adjudications = stats.adjudications,
        rejected_lines = stats.rejected_lines,
        "tally pipeline stopped"
    );
    registry.close().await;
    Ok(())
}
