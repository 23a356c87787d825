//! Shared vocabulary for the Tally verification pipeline.
//!
//! Everything that crosses a crate boundary lives here: the extracted
//! reading, session status, adjudication actions, review-surface control
//! state, and the on-disk configuration.

pub mod config;
pub mod defaults;
pub mod paths;
pub mod types;

pub use config::{ConfigError, LedgerSection, OcrSection, RegistrySection, ReviewSection, TallyConfig};
pub use tally_ids::{IdParseError, PlayerId, SessionId, SubmissionId};
pub use types::{
    format_grouped, AdjudicationAction, ControlState, ExtractedReading, Mark, SessionStatus,
};
