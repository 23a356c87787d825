//! Pipeline coordinator.
//!
//! Turns image submissions into review sessions and adjudications into
//! registry lookups and ledger writes. Cheap to clone; every clone shares the
//! same session book and collaborators.

use crate::pipeline::event::{ImageSubmission, PipelineEvent};
use crate::pipeline::messages;
use crate::pipeline::permissions::PermissionCheck;
use crate::pipeline::registry::Registry;
use crate::pipeline::session::{Finalize, SessionBook, VerificationSession};
use crate::pipeline::surface::{ReviewCard, ReviewSurface};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tally_extract::ValueExtractor;
use tally_protocol::defaults::{DEFAULT_REVIEW_TIMEOUT_SECS, DEFAULT_SESSION_RETENTION_SECS};
use tally_protocol::{
    AdjudicationAction, ControlState, Mark, PlayerId, ReviewSection, SessionId, SessionStatus,
};
use tally_sheets::{LedgerSync, UpsertAction};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub review_timeout: Duration,
    pub retention: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            review_timeout: Duration::from_secs(DEFAULT_REVIEW_TIMEOUT_SECS),
            retention: Duration::from_secs(DEFAULT_SESSION_RETENTION_SECS),
        }
    }
}

impl From<&ReviewSection> for PipelineSettings {
    fn from(review: &ReviewSection) -> Self {
        Self {
            review_timeout: review.timeout(),
            retention: review.retention(),
        }
    }
}

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Not an image.
    Ignored,
    /// Image had no recognizable reading.
    NoReading,
    /// Extraction failed; an announcement was made.
    ExtractionFailed,
    /// Review card could not be posted; no session exists.
    PostFailed,
    Opened(SessionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyOutcome {
    Verified { ledger: UpsertAction },
    /// Verified, but the ledger (or registry) could not be updated.
    VerifiedSyncFailed,
    /// Verified, but the submitter has no display name on file.
    VerifiedWithoutDisplayName,
    Rejected,
    Unauthorized,
    AlreadyResolved,
    UnknownSession,
}

/// Response to the adjudicator who clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjudicationReply {
    pub outcome: ReplyOutcome,
    pub message: String,
    /// Only the clicking actor sees it.
    pub ephemeral: bool,
}

impl AdjudicationReply {
    fn visible(outcome: ReplyOutcome, message: String) -> Self {
        Self {
            outcome,
            message,
            ephemeral: false,
        }
    }

    fn ephemeral(outcome: ReplyOutcome, message: String) -> Self {
        Self {
            outcome,
            message,
            ephemeral: true,
        }
    }
}

struct Inner {
    extractor: ValueExtractor,
    surface: Arc<dyn ReviewSurface>,
    permissions: Arc<dyn PermissionCheck>,
    registry: Arc<dyn Registry>,
    ledger: LedgerSync,
    book: SessionBook,
    settings: PipelineSettings,
}

#[derive(Clone)]
pub struct PipelineCoordinator {
    inner: Arc<Inner>,
}

impl PipelineCoordinator {
    pub fn new(
        extractor: ValueExtractor,
        surface: Arc<dyn ReviewSurface>,
        permissions: Arc<dyn PermissionCheck>,
        registry: Arc<dyn Registry>,
        ledger: LedgerSync,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                extractor,
                surface,
                permissions,
                registry,
                ledger,
                book: SessionBook::new(settings.retention),
                settings,
            }),
        }
    }

    pub fn session(&self, id: &SessionId) -> Option<VerificationSession> {
        self.inner.book.get(id)
    }

    pub fn pending_sessions(&self) -> usize {
        self.inner.book.pending_count()
    }

    /// Consume events until the sender side closes, one task per event.
    /// Waits for in-flight event tasks before returning; expiry timers are
    /// not waited on.
    pub async fn run(self, mut events: mpsc::Receiver<PipelineEvent>) {
        let mut tasks = JoinSet::new();
        while let Some(event) = events.recv().await {
            debug!(kind = event.kind(), "pipeline event");
            let this = self.clone();
            tasks.spawn(async move { this.handle(event).await });
            while let Some(done) = tasks.try_join_next() {
                log_task_result(done);
            }
        }
        while let Some(done) = tasks.join_next().await {
            log_task_result(done);
        }
        info!("pipeline event channel closed");
    }

    async fn handle(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::ImageSubmitted(submission) => {
                self.on_image_submitted(submission).await;
            }
            PipelineEvent::Adjudicate {
                session_id,
                actor,
                action,
                respond_to,
            } => {
                let reply = self.on_adjudicate(&session_id, &actor, action).await;
                if let Some(tx) = respond_to {
                    if tx.send(reply).is_err() {
                        debug!(session_id = %session_id, "adjudication reply receiver dropped");
                    }
                }
            }
        }
    }

    pub async fn on_image_submitted(&self, submission: ImageSubmission) -> SubmissionOutcome {
        let inner = &self.inner;
        if !submission.is_image() {
            debug!(
                submission = %submission.submission,
                content_type = ?submission.content_type,
                "ignoring non-image attachment"
            );
            return SubmissionOutcome::Ignored;
        }

        let pruned = inner.book.prune(Instant::now());
        if pruned > 0 {
            debug!(pruned, "dropped resolved sessions past retention");
        }

        let reading = match inner.extractor.extract(&submission.image).await {
            Ok(Some(reading)) => reading,
            Ok(None) => {
                debug!(submission = %submission.submission, "no growth rate found");
                return SubmissionOutcome::NoReading;
            }
            Err(e) => {
                error!(
                    submission = %submission.submission,
                    submitter = %submission.submitter,
                    error = %e,
                    "image processing failed"
                );
                let text = messages::extraction_failed(&submission.submitter);
                if let Err(e) = inner.surface.announce(&text).await {
                    warn!(error = %e, "failed to announce extraction error");
                }
                return SubmissionOutcome::ExtractionFailed;
            }
        };
        debug!(raw_text = %reading.raw_text, "recognized text");

        let session = VerificationSession::new(
            submission.submission.clone(),
            submission.submitter.clone(),
            reading,
            inner.settings.review_timeout,
        );
        let session_id = session.session_id;
        let deadline = session.deadline;
        let card = ReviewCard::new(&session.submitter, &session.reading);
        inner.book.reserve(session);

        if let Err(e) = inner.surface.post(&session_id, &card).await {
            inner.book.discard(&session_id);
            error!(
                session_id = %session_id,
                submitter = %submission.submitter,
                value = card.value,
                error = %e,
                "failed to post review card"
            );
            return SubmissionOutcome::PostFailed;
        }

        let this = self.clone();
        let timer_id = session_id;
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            this.on_expired(&timer_id).await;
        });
        if !inner.book.arm_timer(&session_id, timer.abort_handle()) {
            timer.abort();
        }

        info!(
            session_id = %session_id,
            submitter = %submission.submitter,
            value = card.value,
            "verification session opened"
        );
        SubmissionOutcome::Opened(session_id)
    }

    pub async fn on_adjudicate(
        &self,
        session_id: &SessionId,
        actor: &PlayerId,
        action: AdjudicationAction,
    ) -> AdjudicationReply {
        let inner = &self.inner;
        if !inner.permissions.has_elevated_permission(actor) {
            warn!(session_id = %session_id, actor = %actor, action = %action, "unauthorized adjudication");
            return AdjudicationReply::ephemeral(ReplyOutcome::Unauthorized, messages::unauthorized());
        }

        let session = match inner
            .book
            .finalize_adjudication(session_id, actor, action, Instant::now())
        {
            Finalize::Resolved(session) => session,
            Finalize::Lapsed(session) => {
                info!(session_id = %session_id, submitter = %session.submitter, "verification session expired");
                self.disable_surface(session_id).await;
                return AdjudicationReply::ephemeral(
                    ReplyOutcome::AlreadyResolved,
                    messages::already_resolved(SessionStatus::Expired),
                );
            }
            Finalize::AlreadyResolved(status) => {
                debug!(session_id = %session_id, status = %status, "late adjudication");
                return AdjudicationReply::ephemeral(
                    ReplyOutcome::AlreadyResolved,
                    messages::already_resolved(status),
                );
            }
            Finalize::Unknown => {
                return AdjudicationReply::ephemeral(
                    ReplyOutcome::UnknownSession,
                    messages::unknown_session(),
                );
            }
        };

        info!(
            session_id = %session_id,
            submitter = %session.submitter,
            actor = %actor,
            status = %session.status,
            value = session.reading.value,
            "verification session resolved"
        );

        match action {
            AdjudicationAction::Reject => self.finish_rejected(&session).await,
            AdjudicationAction::Verify => self.finish_verified(&session).await,
        }
    }

    async fn finish_rejected(&self, session: &VerificationSession) -> AdjudicationReply {
        let text = messages::rejected(&session.submitter);
        self.update_surface(&session.session_id, &text).await;
        self.annotate(session, Mark::Rejected).await;
        AdjudicationReply::visible(ReplyOutcome::Rejected, text)
    }

    async fn finish_verified(&self, session: &VerificationSession) -> AdjudicationReply {
        let inner = &self.inner;
        let submitter = &session.submitter;
        let reading = &session.reading;

        // Controls go dark before any registry or ledger I/O.
        self.update_surface(&session.session_id, &messages::verifying(submitter, reading))
            .await;

        let display_name = match inner.registry.get(submitter).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                warn!(session_id = %session.session_id, submitter = %submitter, value = reading.value, "verified without registered display name");
                self.update_surface(
                    &session.session_id,
                    &messages::verified_unregistered(submitter, reading),
                )
                .await;
                self.annotate(session, Mark::Accepted).await;
                return AdjudicationReply::ephemeral(
                    ReplyOutcome::VerifiedWithoutDisplayName,
                    messages::missing_display_name(submitter, reading),
                );
            }
            Err(e) => {
                error!(session_id = %session.session_id, submitter = %submitter, value = reading.value, error = %e, "display name lookup failed");
                let text = messages::registry_failed(submitter, reading);
                self.update_surface(&session.session_id, &text).await;
                self.annotate(session, Mark::Accepted).await;
                return AdjudicationReply::visible(ReplyOutcome::VerifiedSyncFailed, text);
            }
        };

        match inner.ledger.upsert(&display_name, reading.value).await {
            Ok(action) => {
                let text = messages::verified(submitter, reading);
                self.update_surface(&session.session_id, &text).await;
                self.annotate(session, Mark::Accepted).await;
                AdjudicationReply::visible(ReplyOutcome::Verified { ledger: action }, text)
            }
            Err(e) => {
                error!(
                    session_id = %session.session_id,
                    submitter = %submitter,
                    display_name = %display_name,
                    value = reading.value,
                    error = %e,
                    "ledger update failed"
                );
                let text = messages::ledger_failed(submitter, &display_name, reading, &e);
                self.update_surface(&session.session_id, &text).await;
                self.annotate(session, Mark::Accepted).await;
                AdjudicationReply::visible(ReplyOutcome::VerifiedSyncFailed, text)
            }
        }
    }

    pub async fn on_expired(&self, session_id: &SessionId) {
        match self.inner.book.finalize_expiry(session_id, Instant::now()) {
            Finalize::Resolved(session) => {
                info!(
                    session_id = %session_id,
                    submitter = %session.submitter,
                    value = session.reading.value,
                    "verification session expired"
                );
                self.disable_surface(session_id).await;
            }
            other => debug!(session_id = %session_id, outcome = ?other, "expiry timer found session settled"),
        }
    }

    async fn update_surface(&self, session_id: &SessionId, text: &str) {
        if let Err(e) = self
            .inner
            .surface
            .update(session_id, text, ControlState::Disabled)
            .await
        {
            warn!(session_id = %session_id, error = %e, "failed to update review card");
        }
    }

    async fn disable_surface(&self, session_id: &SessionId) {
        if let Err(e) = self.inner.surface.disable(session_id).await {
            warn!(session_id = %session_id, error = %e, "failed to disable review card");
        }
    }

    async fn annotate(&self, session: &VerificationSession, mark: Mark) {
        if let Err(e) = self.inner.surface.annotate(&session.submission, mark).await {
            warn!(submission = %session.submission, error = %e, "failed to mark submission");
        }
    }
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "pipeline event task failed");
    }
}
