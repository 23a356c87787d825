//! Tally - screenshot growth-rate verification.
//!
//! Shared functionality for the `tally` binary: the verification pipeline
//! and the JSON-lines gateway that connects it to a chat bridge.

pub mod gateway;
pub mod pipeline;

pub use gateway::{ConsoleSurface, Gateway, GatewayEvent, GatewayOutput, JsonLineWriter};
pub use pipeline::{
    AdjudicationReply, ImageSubmission, PipelineCoordinator, PipelineEvent, PipelineSettings,
    ReplyOutcome, SubmissionOutcome,
};
