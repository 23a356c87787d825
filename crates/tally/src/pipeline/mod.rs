//! Screenshot verification pipeline.
//!
//! ```text
//! ImageSubmitted ─► extract ─► reserve session ─► post card ─► arm timer
//!                                     │
//! Adjudicate ─► permission ─► finalize ┼─► Verify: registry ─► ledger
//!                                     └─► Reject: update card, mark ❌
//! timer ─► finalize expiry ─► disable card
//! ```

pub mod coordinator;
pub mod event;
pub mod messages;
pub mod permissions;
pub mod registry;
pub mod session;
pub mod surface;

pub use coordinator::{
    AdjudicationReply, PipelineCoordinator, PipelineSettings, ReplyOutcome, SubmissionOutcome,
};
pub use event::{ImageSubmission, PipelineEvent};
pub use permissions::{PermissionCheck, StaticPermissions};
pub use registry::Registry;
pub use session::{Finalize, SessionBook, VerificationSession};
pub use surface::{ReviewCard, ReviewSurface, SurfaceError};
