//! External ledger (spreadsheet) access.
//!
//! The ledger is a two-column range keyed by display name. [`LedgerSync`]
//! performs the keyed upsert over any [`LedgerClient`]; [`SheetsClient`] talks
//! to the Google Sheets v4 values API and [`MemoryLedger`] keeps rows in memory.

mod client;
mod error;
mod memory;
mod upsert;

pub use client::{LedgerClient, SheetsClient};
pub use error::{LedgerError, Result};
pub use memory::MemoryLedger;
pub use upsert::{apply_upsert, LedgerSync, UpsertAction};
