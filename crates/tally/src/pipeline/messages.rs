//! User-visible texts. Each names the submitter and the value so a
//! moderator can redo the step by hand.

use tally_protocol::{ExtractedReading, PlayerId, SessionStatus};
use tally_sheets::LedgerError;

pub fn review_card(submitter: &PlayerId, reading: &ExtractedReading) -> String {
    format!("{}\nGrowth Rate: **{}**", submitter.mention(), reading.formatted)
}

pub fn verified(submitter: &PlayerId, reading: &ExtractedReading) -> String {
    format!(
        "{}'s GR: {} has been verified and updated in the sheet!",
        submitter.mention(),
        reading.formatted
    )
}

/// Interim card text while the registry and ledger are consulted.
pub fn verifying(submitter: &PlayerId, reading: &ExtractedReading) -> String {
    format!(
        "{}'s GR: {} was verified. Updating the sheet...",
        submitter.mention(),
        reading.formatted
    )
}

pub fn rejected(submitter: &PlayerId) -> String {
    format!("{}'s Growth Rate was rejected!", submitter.mention())
}

pub fn extraction_failed(submitter: &PlayerId) -> String {
    format!("Error processing image from {}", submitter.mention())
}

/// Card text after a Verify whose submitter has no display name on file.
pub fn verified_unregistered(submitter: &PlayerId, reading: &ExtractedReading) -> String {
    format!(
        "{}'s GR: {} has been verified, but no IGN is registered so the sheet was not updated.",
        submitter.mention(),
        reading.formatted
    )
}

/// Ephemeral notice to the adjudicator for the same case.
pub fn missing_display_name(submitter: &PlayerId, reading: &ExtractedReading) -> String {
    format!(
        "No IGN registered for {}. Ask them to set one, then record {} in the sheet manually.",
        submitter.mention(),
        reading.formatted
    )
}

pub fn ledger_failed(
    submitter: &PlayerId,
    display_name: &str,
    reading: &ExtractedReading,
    error: &LedgerError,
) -> String {
    format!(
        "Failed to update Google Sheet ({}). {}'s GR: {} was verified; record it for `{}` manually.",
        error,
        submitter.mention(),
        reading.formatted,
        display_name
    )
}

pub fn registry_failed(submitter: &PlayerId, reading: &ExtractedReading) -> String {
    format!(
        "Failed to look up the IGN for {}. Their GR: {} was verified; record it in the sheet manually.",
        submitter.mention(),
        reading.formatted
    )
}

pub fn unauthorized() -> String {
    "You do not have permission to verify or reject growth rates.".to_string()
}

pub fn already_resolved(status: SessionStatus) -> String {
    format!("This submission has already been resolved ({}).", status)
}

pub fn unknown_session() -> String {
    "This review is no longer available.".to_string()
}
