//! JSON-lines gateway driving a real coordinator.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::sync::Arc;
use std::time::Duration;
use tally::gateway::{ConsoleSurface, Gateway, JsonLineWriter};
use tally_test_utils::{MemoryRegistry, ScriptedRecognizer};
use tally::pipeline::{PipelineCoordinator, PipelineSettings, Registry, StaticPermissions};
use tally_extract::{ImageNormalizer, ValueExtractor};
use tally_protocol::PlayerId;
use tally_sheets::{LedgerSync, MemoryLedger};
use tempfile::TempDir;
use tokio::sync::mpsc;

async fn wait_for_line(
    writer: &JsonLineWriter<Vec<u8>>,
    kind: &str,
) -> serde_json::Value {
    for _ in 0..500 {
        if let Some(line) = writer
            .lines()
            .await
            .into_iter()
            .find(|line| line["type"] == kind)
        {
            return line;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no '{kind}' line written");
}

#[tokio::test]
async fn test_image_then_verify_over_gateway() {
    let dir = TempDir::new().unwrap();
    let shot = dir.path().join("shot.png");
    DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 20, Luma([30])))
        .save_with_format(&shot, ImageFormat::Png)
        .unwrap();

    let writer = Arc::new(JsonLineWriter::new(Vec::new()));
    let registry = Arc::new(MemoryRegistry::new());
    registry
        .set(&PlayerId::parse("42").unwrap(), "Nova")
        .await
        .unwrap();
    let ledger = Arc::new(MemoryLedger::new());

    let coordinator = PipelineCoordinator::new(
        ValueExtractor::new(
            ImageNormalizer::default(),
            Arc::new(ScriptedRecognizer::text("Growth Rate: 12,345")),
        )
        .unwrap(),
        Arc::new(ConsoleSurface::new(writer.clone())),
        Arc::new(StaticPermissions::new([PlayerId::parse("900").unwrap()])),
        registry,
        LedgerSync::new(ledger.clone()),
        PipelineSettings::default(),
    );

    let (tx, rx) = mpsc::channel(8);
    let pipeline = tokio::spawn(coordinator.run(rx));

    let image_line = format!(
        "{{\"type\":\"image_submitted\",\"submission\":\"m1\",\"submitter\":\"42\",\"content_type\":\"image/png\",\"path\":{}}}\n",
        serde_json::to_string(&shot).unwrap()
    );
    let stats = Gateway::new(writer.clone(), tx.clone())
        .pump(image_line.as_bytes())
        .await
        .unwrap();
    assert_eq!(stats.images, 1);

    let post = wait_for_line(&writer, "post").await;
    assert_eq!(post["card"]["text"], "<@42>\nGrowth Rate: **12,345**");
    assert_eq!(post["controls"], "active");
    let session_id = post["session_id"].as_str().unwrap().to_string();

    let clicks = format!(
        "{{\"type\":\"adjudicate\",\"session_id\":\"{id}\",\"actor\":\"111\",\"action\":\"verify\"}}\n\
         {{\"type\":\"adjudicate\",\"session_id\":\"{id}\",\"actor\":\"900\",\"action\":\"verify\"}}\n",
        id = session_id
    );
    let stats = Gateway::new(writer.clone(), tx)
        .pump(clicks.as_bytes())
        .await
        .unwrap();
    assert_eq!(stats.adjudications, 2);
    pipeline.await.unwrap();

    let lines = writer.lines().await;
    let replies: Vec<&serde_json::Value> =
        lines.iter().filter(|l| l["type"] == "reply").collect();
    assert_eq!(replies.len(), 2);

    let refused = replies.iter().find(|r| r["actor"] == "111").unwrap();
    assert_eq!(refused["outcome"]["kind"], "unauthorized");
    assert_eq!(refused["ephemeral"], true);

    let accepted = replies.iter().find(|r| r["actor"] == "900").unwrap();
    assert_eq!(accepted["outcome"]["kind"], "verified");
    assert_eq!(
        accepted["message"],
        "<@42>'s GR: 12,345 has been verified and updated in the sheet!"
    );

    assert!(lines
        .iter()
        .any(|l| l["type"] == "annotate" && l["mark"] == "accepted"));
    assert_eq!(
        ledger.rows().await,
        vec![vec!["Nova".to_string(), "12345".to_string()]]
    );
}
