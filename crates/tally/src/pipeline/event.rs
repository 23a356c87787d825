//! Inputs to the pipeline.

use crate::pipeline::coordinator::AdjudicationReply;
use tally_protocol::{AdjudicationAction, PlayerId, SessionId, SubmissionId};
use tokio::sync::oneshot;

/// An image posted to the watched channel.
#[derive(Debug, Clone)]
pub struct ImageSubmission {
    pub submission: SubmissionId,
    pub submitter: PlayerId,
    pub image: Vec<u8>,
    /// MIME type reported by the gateway, if any.
    pub content_type: Option<String>,
}

impl ImageSubmission {
    /// Submissions without a content type are let through.
    pub fn is_image(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) => ct.trim().to_ascii_lowercase().starts_with("image/"),
            None => true,
        }
    }
}

/// Events consumed by [`crate::pipeline::PipelineCoordinator::run`].
#[derive(Debug)]
pub enum PipelineEvent {
    ImageSubmitted(ImageSubmission),

    /// A click on one of the review actions.
    Adjudicate {
        session_id: SessionId,
        actor: PlayerId,
        action: AdjudicationAction,
        respond_to: Option<oneshot::Sender<AdjudicationReply>>,
    },
}

impl PipelineEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ImageSubmitted(_) => "image_submitted",
            Self::Adjudicate { .. } => "adjudicate",
        }
    }
}
