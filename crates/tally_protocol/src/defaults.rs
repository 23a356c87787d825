//! Canonical default values shared by the pipeline, the CLI and the config file.

/// Review surfaces stay clickable for five minutes.
pub const DEFAULT_REVIEW_TIMEOUT_SECS: u64 = 300;
/// Terminal sessions are remembered this long so late clicks read "already resolved".
pub const DEFAULT_SESSION_RETENTION_SECS: u64 = 3600;

pub const DEFAULT_LEDGER_RANGE: &str = "Members!A:B";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_SHEETS_TOKEN_ENV: &str = "TALLY_SHEETS_TOKEN";

pub const DEFAULT_TESSERACT_PATH: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 1600;
pub const DEFAULT_MAX_IMAGE_HEIGHT: u32 = 1600;

/// Characters the OCR engine may emit. Symbols outside this set are noise.
pub const OCR_CHAR_ALLOWLIST: &str =
    "0123456789,.:ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz ";

/// Largest reading accepted (2^53 - 1); longer digit runs are treated as misreads.
pub const MAX_SAFE_READING: u64 = 9_007_199_254_740_991;
