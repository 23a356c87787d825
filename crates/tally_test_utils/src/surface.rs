//! Review surface that records instead of rendering.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tally::pipeline::{ReviewCard, ReviewSurface, SurfaceError};
use tally_protocol::{ControlState, Mark, SessionId, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Post {
        session_id: SessionId,
        card: ReviewCard,
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
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    fail_posts: AtomicBool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_posts(&self, fail: bool) {
        self.fail_posts.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn posts(&self) -> Vec<(SessionId, ReviewCard)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Post { session_id, card } => Some((session_id, card)),
                _ => None,
            })
            .collect()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Announce { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn marks(&self) -> Vec<(SubmissionId, Mark)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Annotate { submission, mark } => Some((submission, mark)),
                _ => None,
            })
            .collect()
    }

    /// Calls addressed to one session, in order.
    pub fn calls_for(&self, id: &SessionId) -> Vec<SurfaceCall> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                SurfaceCall::Post { session_id, .. }
                | SurfaceCall::Update { session_id, .. }
                | SurfaceCall::Disable { session_id } => session_id == id,
                _ => false,
            })
            .collect()
    }

    fn record(&self, call: SurfaceCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl ReviewSurface for RecordingSurface {
    async fn post(&self, session_id: &SessionId, card: &ReviewCard) -> Result<(), SurfaceError> {
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(SurfaceError::Unavailable("post refused".to_string()));
        }
        self.record(SurfaceCall::Post {
            session_id: *session_id,
            card: card.clone(),
        });
        Ok(())
    }

    async fn update(
        &self,
        session_id: &SessionId,
        text: &str,
        controls: ControlState,
    ) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Update {
            session_id: *session_id,
            text: text.to_string(),
            controls,
        });
        Ok(())
    }

    async fn disable(&self, session_id: &SessionId) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Disable {
            session_id: *session_id,
        });
        Ok(())
    }

    async fn announce(&self, text: &str) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Announce {
            text: text.to_string(),
        });
        Ok(())
    }

    async fn annotate(&self, submission: &SubmissionId, mark: Mark) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Annotate {
            submission: submission.clone(),
            mark,
        });
        Ok(())
    }
}
