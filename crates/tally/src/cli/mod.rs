//! CLI module for Tally.

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod ign;
pub mod ledger;
pub mod output;
pub mod run;
