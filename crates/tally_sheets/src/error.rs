use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Ledger access token not set (expected in ${0})")]
    MissingToken(String),

    #[error("Ledger not configured: {0}")]
    NotConfigured(String),

    #[error("Ledger write rejected: {0}")]
    Rejected(String),
}
