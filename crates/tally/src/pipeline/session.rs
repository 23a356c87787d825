//! Verification sessions and the book that guards their transitions.
//!
//! Every status change goes through [`SessionBook::finalize_adjudication`] or
//! [`SessionBook::finalize_expiry`]. Both flip the status while holding the
//! book lock, so the first caller wins and everyone after sees a terminal
//! status. The lock is a `std::sync::Mutex` and is never held across `.await`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tally_protocol::{
    AdjudicationAction, ExtractedReading, PlayerId, SessionId, SessionStatus, SubmissionId,
};
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// One pending (or recently resolved) review of an extracted reading.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    pub session_id: SessionId,
    pub submission: SubmissionId,
    pub submitter: PlayerId,
    pub reading: ExtractedReading,
    pub status: SessionStatus,
    pub opened_at: DateTime<Utc>,
    pub deadline: Instant,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<PlayerId>,
    resolved_instant: Option<Instant>,
    timer: Option<AbortHandle>,
}

impl VerificationSession {
    pub fn new(
        submission: SubmissionId,
        submitter: PlayerId,
        reading: ExtractedReading,
        timeout: Duration,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            submission,
            submitter,
            reading,
            status: SessionStatus::Pending,
            opened_at: Utc::now(),
            deadline: Instant::now() + timeout,
            resolved_at: None,
            resolved_by: None,
            resolved_instant: None,
            timer: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SessionStatus::Pending
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    fn resolve(&mut self, status: SessionStatus, by: Option<PlayerId>, now: Instant) {
        self.status = status;
        self.resolved_by = by;
        self.resolved_at = Some(Utc::now());
        self.resolved_instant = Some(now);
    }
}

/// Result of a guarded transition attempt.
#[derive(Debug, Clone)]
pub enum Finalize {
    /// This call performed the transition. Carries the session after the flip.
    Resolved(VerificationSession),
    /// An adjudication arrived after the deadline; the session was expired instead.
    Lapsed(VerificationSession),
    /// Someone else already resolved it.
    AlreadyResolved(SessionStatus),
    /// Never existed, or the tombstone has been pruned.
    Unknown,
}

/// In-memory table of sessions keyed by session id.
#[derive(Debug)]
pub struct SessionBook {
    sessions: Mutex<HashMap<SessionId, VerificationSession>>,
    retention: Duration,
}

impl SessionBook {
    /// `retention` is how long terminal sessions are kept as tombstones.
    pub fn new(retention: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            retention,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, VerificationSession>> {
        // Entries are only ever replaced whole or flipped field by field.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a new pending session ahead of posting its review surface.
    pub fn reserve(&self, session: VerificationSession) {
        self.lock().insert(session.session_id, session);
    }

    /// Drop a reservation whose surface could not be posted.
    pub fn discard(&self, id: &SessionId) -> Option<VerificationSession> {
        self.lock().remove(id)
    }

    /// Attach the expiry timer. Returns false (and leaves the book untouched)
    /// if the session is gone or already terminal; the caller should abort
    /// the handle.
    pub fn arm_timer(&self, id: &SessionId, timer: AbortHandle) -> bool {
        match self.lock().get_mut(id) {
            Some(session) if session.is_pending() => {
                session.timer = Some(timer);
                true
            }
            _ => false,
        }
    }

    /// Accept or decline a pending session on behalf of `actor`.
    pub fn finalize_adjudication(
        &self,
        id: &SessionId,
        actor: &PlayerId,
        action: AdjudicationAction,
        now: Instant,
    ) -> Finalize {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(id) else {
            return Finalize::Unknown;
        };
        if !session.is_pending() {
            return Finalize::AlreadyResolved(session.status);
        }

        if let Some(timer) = session.timer.take() {
            timer.abort();
        }

        if now >= session.deadline {
            session.resolve(SessionStatus::Expired, None, now);
            return Finalize::Lapsed(session.clone());
        }

        session.resolve(action.target_status(), Some(actor.clone()), now);
        Finalize::Resolved(session.clone())
    }

    /// Expire a pending session. Called from its own timer task, so the
    /// handle is dropped rather than aborted.
    pub fn finalize_expiry(&self, id: &SessionId, now: Instant) -> Finalize {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(id) else {
            return Finalize::Unknown;
        };
        if !session.is_pending() {
            return Finalize::AlreadyResolved(session.status);
        }
        session.timer = None;
        session.resolve(SessionStatus::Expired, None, now);
        Finalize::Resolved(session.clone())
    }

    pub fn get(&self, id: &SessionId) -> Option<VerificationSession> {
        self.lock().get(id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().values().filter(|s| s.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove tombstones resolved more than `retention` before `now`.
    /// Pending sessions are never pruned. Returns the number removed.
    pub fn prune(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| match session.resolved_instant {
            Some(resolved) => now.saturating_duration_since(resolved) < self.retention,
            None => true,
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(300);

    fn session() -> VerificationSession {
        VerificationSession::new(
            SubmissionId::parse("msg-1").unwrap(),
            PlayerId::parse("111").unwrap(),
            ExtractedReading::new("Growth Rate: 50,000", 50_000),
            TIMEOUT,
        )
    }

    fn admin() -> PlayerId {
        PlayerId::parse("900").unwrap()
    }

    #[tokio::test]
    async fn test_first_adjudication_wins() {
        let book = SessionBook::new(Duration::from_secs(3600));
        let s = session();
        let id = s.session_id;
        book.reserve(s);

        let now = Instant::now();
        match book.finalize_adjudication(&id, &admin(), AdjudicationAction::Verify, now) {
            Finalize::Resolved(s) => {
                assert_eq!(s.status, SessionStatus::Verified);
                assert_eq!(s.resolved_by, Some(admin()));
                assert!(s.resolved_at.is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }

        assert!(matches!(
            book.finalize_adjudication(&id, &admin(), AdjudicationAction::Reject, now),
            Finalize::AlreadyResolved(SessionStatus::Verified)
        ));
        assert!(matches!(
            book.finalize_expiry(&id, now),
            Finalize::AlreadyResolved(SessionStatus::Verified)
        ));
        assert_eq!(book.get(&id).unwrap().status, SessionStatus::Verified);
    }

    #[tokio::test]
    async fn test_adjudication_after_deadline_lapses() {
        let book = SessionBook::new(Duration::from_secs(3600));
        let s = session();
        let id = s.session_id;
        let deadline = s.deadline;
        book.reserve(s);

        match book.finalize_adjudication(&id, &admin(), AdjudicationAction::Verify, deadline) {
            Finalize::Lapsed(s) => {
                assert_eq!(s.status, SessionStatus::Expired);
                assert!(s.resolved_by.is_none());
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            book.finalize_adjudication(&id, &admin(), AdjudicationAction::Verify, deadline),
            Finalize::AlreadyResolved(SessionStatus::Expired)
        ));
    }

    #[tokio::test]
    async fn test_expiry_then_adjudication() {
        let book = SessionBook::new(Duration::from_secs(3600));
        let s = session();
        let id = s.session_id;
        book.reserve(s);

        assert!(matches!(
            book.finalize_expiry(&id, Instant::now()),
            Finalize::Resolved(_)
        ));
        assert!(matches!(
            book.finalize_adjudication(&id, &admin(), AdjudicationAction::Reject, Instant::now()),
            Finalize::AlreadyResolved(SessionStatus::Expired)
        ));
    }

    #[tokio::test]
    async fn test_adjudication_aborts_timer() {
        let book = SessionBook::new(Duration::from_secs(3600));
        let s = session();
        let id = s.session_id;
        book.reserve(s);

        let timer = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        assert!(book.arm_timer(&id, timer.abort_handle()));
        assert!(book.get(&id).unwrap().has_timer());

        book.finalize_adjudication(&id, &admin(), AdjudicationAction::Reject, Instant::now());
        let joined = timer.await;
        assert!(joined.unwrap_err().is_cancelled());
        assert!(!book.get(&id).unwrap().has_timer());
    }

    #[tokio::test]
    async fn test_arm_timer_on_resolved_session_is_refused() {
        let book = SessionBook::new(Duration::from_secs(3600));
        let s = session();
        let id = s.session_id;
        book.reserve(s);
        book.finalize_adjudication(&id, &admin(), AdjudicationAction::Reject, Instant::now());

        let timer = tokio::spawn(async {});
        assert!(!book.arm_timer(&id, timer.abort_handle()));
        assert!(!book.arm_timer(&SessionId::new(), timer.abort_handle()));
    }

    #[tokio::test]
    async fn test_unknown_and_discarded_sessions() {
        let book = SessionBook::new(Duration::from_secs(3600));
        assert!(matches!(
            book.finalize_expiry(&SessionId::new(), Instant::now()),
            Finalize::Unknown
        ));

        let s = session();
        let id = s.session_id;
        book.reserve(s);
        assert!(book.discard(&id).is_some());
        assert!(book.is_empty());
        assert!(matches!(
            book.finalize_adjudication(&id, &admin(), AdjudicationAction::Verify, Instant::now()),
            Finalize::Unknown
        ));
    }

    #[tokio::test]
    async fn test_prune_keeps_pending_and_fresh_tombstones() {
        let retention = Duration::from_secs(3600);
        let book = SessionBook::new(retention);
        let pending = session();
        let resolved = session();
        let resolved_id = resolved.session_id;
        book.reserve(pending);
        book.reserve(resolved);

        let t0 = Instant::now();
        book.finalize_adjudication(&resolved_id, &admin(), AdjudicationAction::Reject, t0);
        assert_eq!(book.pending_count(), 1);

        assert_eq!(book.prune(t0 + Duration::from_secs(10)), 0);
        assert_eq!(book.len(), 2);

        assert_eq!(book.prune(t0 + retention), 1);
        assert_eq!(book.len(), 1);
        assert_eq!(book.pending_count(), 1);
        assert!(book.get(&resolved_id).is_none());
    }
}
