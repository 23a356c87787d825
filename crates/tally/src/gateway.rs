//! JSON-lines chat gateway.
//!
//! Inbound events are read one JSON object per line (usually stdin); review
//! surface operations and adjudication replies are written the same way
//! (usually stdout). A chat bridge process sits on the other end.
//!
//! ```text
//! {"type":"image_submitted","submission":"m1","submitter":"42","content_type":"image/png","path":"shot.png"}
//! {"type":"adjudicate","session_id":"<uuid>","actor":"900","action":"verify"}
//! ```

use crate::pipeline::{
    AdjudicationReply, ImageSubmission, PipelineEvent, ReviewCard, ReviewSurface, SurfaceError,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tally_protocol::{
    AdjudicationAction, ControlState, Mark, PlayerId, SessionId, SubmissionId,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One inbound line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    ImageSubmitted {
        submission: SubmissionId,
        submitter: PlayerId,
        #[serde(default)]
        content_type: Option<String>,
        /// Local file holding the downloaded attachment.
        path: PathBuf,
    },
    Adjudicate {
        session_id: SessionId,
        actor: PlayerId,
        action: AdjudicationAction,
    },
}

/// One outbound line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayOutput {
    Post {
        session_id: SessionId,
        card: ReviewCard,
        controls: ControlState,
    },
    Update {
        session_id: SessionId,
        text: String,
        controls: ControlState,
    },
    Disable {
        session_id: SessionId,
    },
    Announce {
        text: String,
    },
    Annotate {
        submission: SubmissionId,
        mark: Mark,
        emoji: &'static str,
    },
    Reply {
        session_id: SessionId,
        actor: PlayerId,
        #[serde(flatten)]
        reply: AdjudicationReply,
    },
    Error {
        line: usize,
        message: String,
    },
}

/// Serializes writes so lines from concurrent tasks never interleave.
pub struct JsonLineWriter<W> {
    out: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLineWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub async fn emit(&self, output: &GatewayOutput) -> Result<(), SurfaceError> {
        let mut line = serde_json::to_vec(output)?;
        line.push(b'\n');
        let mut out = self.out.lock().await;
        out.write_all(&line).await?;
        out.flush().await?;
        Ok(())
    }
}

impl JsonLineWriter<Vec<u8>> {
    /// Everything written so far, one parsed value per line.
    pub async fn lines(&self) -> Vec<serde_json::Value> {
        let out = self.out.lock().await;
        String::from_utf8_lossy(&out)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

/// [`ReviewSurface`] that writes every operation as a gateway output line.
pub struct ConsoleSurface<W> {
    writer: Arc<JsonLineWriter<W>>,
}

impl<W> ConsoleSurface<W> {
    pub fn new(writer: Arc<JsonLineWriter<W>>) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> ReviewSurface for ConsoleSurface<W> {
    async fn post(&self, session_id: &SessionId, card: &ReviewCard) -> Result<(), SurfaceError> {
        self.writer
            .emit(&GatewayOutput::Post {
                session_id: session_id.clone(),
                card: card.clone(),
                controls: ControlState::Active,
            })
            .await
    }

    async fn update(
        &self,
        session_id: &SessionId,
        text: &str,
        controls: ControlState,
    ) -> Result<(), SurfaceError> {
        self.writer
            .emit(&GatewayOutput::Update {
                session_id: session_id.clone(),
                text: text.to_string(),
                controls,
            })
            .await
    }

    async fn disable(&self, session_id: &SessionId) -> Result<(), SurfaceError> {
        self.writer
            .emit(&GatewayOutput::Disable {
                session_id: session_id.clone(),
            })
            .await
    }

    async fn announce(&self, text: &str) -> Result<(), SurfaceError> {
        self.writer
            .emit(&GatewayOutput::Announce {
                text: text.to_string(),
            })
            .await
    }

    async fn annotate(&self, submission: &SubmissionId, mark: Mark) -> Result<(), SurfaceError> {
        self.writer
            .emit(&GatewayOutput::Annotate {
                submission: submission.clone(),
                mark,
                emoji: mark.emoji(),
            })
            .await
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    pub images: usize,
    pub adjudications: usize,
    pub rejected_lines: usize,
}

/// Feeds gateway input into the pipeline and writes replies back.
pub struct Gateway<W> {
    writer: Arc<JsonLineWriter<W>>,
    events: mpsc::Sender<PipelineEvent>,
}

impl<W: AsyncWrite + Unpin + Send + 'static> Gateway<W> {
    pub fn new(writer: Arc<JsonLineWriter<W>>, events: mpsc::Sender<PipelineEvent>) -> Self {
        Self { writer, events }
    }

    /// Read until EOF. Malformed lines are answered with an `error` line and
    /// skipped. Returns once every adjudication reply has been written.
    pub async fn pump<R: AsyncBufRead + Unpin>(self, reader: R) -> Result<PumpStats> {
        let mut stats = PumpStats::default();
        let mut replies = JoinSet::new();
        let mut lines = reader.lines();
        let mut line_no = 0;

        while let Some(line) = lines.next_line().await.context("Failed to read gateway input")? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let event = match serde_json::from_str::<GatewayEvent>(line) {
                Ok(event) => event,
                Err(e) => {
                    stats.rejected_lines += 1;
                    self.reject_line(line_no, format!("Invalid event: {}", e)).await;
                    continue;
                }
            };

            match event {
                GatewayEvent::ImageSubmitted {
                    submission,
                    submitter,
                    content_type,
                    path,
                } => {
                    let image = match tokio::fs::read(&path).await {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            stats.rejected_lines += 1;
                            self.reject_line(
                                line_no,
                                format!("Cannot read {}: {}", path.display(), e),
                            )
                            .await;
                            continue;
                        }
                    };
                    stats.images += 1;
                    self.send(PipelineEvent::ImageSubmitted(ImageSubmission {
                        submission,
                        submitter,
                        image,
                        content_type,
                    }))
                    .await?;
                }
                GatewayEvent::Adjudicate {
                    session_id,
                    actor,
                    action,
                } => {
                    stats.adjudications += 1;
                    let (tx, rx) = oneshot::channel();
                    self.send(PipelineEvent::Adjudicate {
                        session_id: session_id.clone(),
                        actor: actor.clone(),
                        action,
                        respond_to: Some(tx),
                    })
                    .await?;

                    let writer = self.writer.clone();
                    replies.spawn(async move {
                        let Ok(reply) = rx.await else {
                            warn!(session_id = %session_id, "pipeline dropped adjudication");
                            return;
                        };
                        let output = GatewayOutput::Reply {
                            session_id,
                            actor,
                            reply,
                        };
                        if let Err(e) = writer.emit(&output).await {
                            warn!(error = %e, "failed to write adjudication reply");
                        }
                    });
                }
            }
        }

        while replies.join_next().await.is_some() {}
        debug!(?stats, "gateway input closed");
        Ok(stats)
    }

    async fn send(&self, event: PipelineEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("Pipeline stopped accepting events"))
    }

    async fn reject_line(&self, line: usize, message: String) {
        warn!(line, %message, "rejected gateway input");
        if let Err(e) = self.writer.emit(&GatewayOutput::Error { line, message }).await {
            warn!(error = %e, "failed to write gateway error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_event() {
        let event: GatewayEvent = serde_json::from_str(
            r#"{"type":"image_submitted","submission":"m1","submitter":"42","path":"/tmp/a.png"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            GatewayEvent::ImageSubmitted {
                submission: SubmissionId::parse("m1").unwrap(),
                submitter: PlayerId::parse("42").unwrap(),
                content_type: None,
                path: PathBuf::from("/tmp/a.png"),
            }
        );
    }

    #[test]
    fn test_parse_adjudicate_event() {
        let id = SessionId::new();
        let line = format!(
            r#"{{"type":"adjudicate","session_id":"{}","actor":"900","action":"reject"}}"#,
            id
        );
        let event: GatewayEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(
            event,
            GatewayEvent::Adjudicate {
                session_id: id,
                actor: PlayerId::parse("900").unwrap(),
                action: AdjudicationAction::Reject,
            }
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<GatewayEvent>(r#"{"type":"ping"}"#).is_err());
    }

    #[tokio::test]
    async fn test_console_surface_lines() {
        let writer = Arc::new(JsonLineWriter::new(Vec::new()));
        let surface = ConsoleSurface::new(writer.clone());
        let submission = SubmissionId::parse("m1").unwrap();
        let id = SessionId::new();

        surface.announce("hello").await.unwrap();
        surface.annotate(&submission, Mark::Rejected).await.unwrap();
        surface.disable(&id).await.unwrap();

        let lines = writer.lines().await;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "announce");
        assert_eq!(lines[0]["text"], "hello");
        assert_eq!(lines[1]["type"], "annotate");
        assert_eq!(lines[1]["mark"], "rejected");
        assert_eq!(lines[1]["emoji"], "\u{274c}");
        assert_eq!(lines[2]["type"], "disable");
        assert_eq!(lines[2]["session_id"], id.to_string());
    }

    #[tokio::test]
    async fn test_pump_rejects_bad_lines() {
        let writer = Arc::new(JsonLineWriter::new(Vec::new()));
        let (tx, mut rx) = mpsc::channel(8);
        let gateway = Gateway::new(writer.clone(), tx);

        let input = "not json\n\n{\"type\":\"image_submitted\",\"submission\":\"m\",\"submitter\":\"1\",\"path\":\"/nonexistent/tally/x.png\"}\n";
        let stats = gateway.pump(input.as_bytes()).await.unwrap();

        assert_eq!(stats.rejected_lines, 2);
        assert_eq!(stats.images, 0);
        assert!(rx.recv().await.is_none());

        let lines = writer.lines().await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "error");
        assert_eq!(lines[0]["line"], 1);
        assert_eq!(lines[1]["line"], 3);
    }
}
