//! Review surface seam: where review cards are posted and notices shown.

use async_trait::async_trait;
use serde::Serialize;
use tally_protocol::{ControlState, ExtractedReading, Mark, PlayerId, SessionId, SubmissionId};
use thiserror::Error;

use crate::pipeline::messages;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Review surface unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Review card shown to adjudicators, with Verify/Reject controls active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewCard {
    pub submitter: PlayerId,
    pub value: u64,
    pub formatted: String,
    pub text: String,
}

impl ReviewCard {
    pub fn new(submitter: &PlayerId, reading: &ExtractedReading) -> Self {
        Self {
            submitter: submitter.clone(),
            value: reading.value,
            formatted: reading.formatted.clone(),
            text: messages::review_card(submitter, reading),
        }
    }
}

/// Chat-side operations the pipeline performs. A posted card is addressed by
/// its session id from then on.
#[async_trait]
pub trait ReviewSurface: Send + Sync {
    async fn post(&self, session_id: &SessionId, card: &ReviewCard) -> Result<(), SurfaceError>;

    async fn update(
        &self,
        session_id: &SessionId,
        text: &str,
        controls: ControlState,
    ) -> Result<(), SurfaceError>;

    /// Disable the controls, leaving the text as it was.
    async fn disable(&self, session_id: &SessionId) -> Result<(), SurfaceError>;

    /// Channel-wide notice.
    async fn announce(&self, text: &str) -> Result<(), SurfaceError>;

    async fn annotate(&self, submission: &SubmissionId, mark: Mark) -> Result<(), SurfaceError>;
}
