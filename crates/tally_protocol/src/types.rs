//! Pipeline vocabulary types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Readings
// ============================================================================

/// A numeric value recognized in a screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReading {
    /// Full recognized text the value was taken from.
    pub raw_text: String,
    pub value: u64,
    /// `value` with thousands separators, for display.
    pub formatted: String,
}

impl ExtractedReading {
    pub fn new(raw_text: impl Into<String>, value: u64) -> Self {
        Self {
            raw_text: raw_text.into(),
            value,
            formatted: format_grouped(value),
        }
    }
}

/// Format an integer with comma thousands separators (en-US grouping).
///
/// Examples:
/// - 999 -> "999"
/// - 12345 -> "12,345"
/// - 1000000 -> "1,000,000"
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// Sessions
// ============================================================================

/// Lifecycle status of a verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Awaiting adjudication
    Pending,
    /// Accepted by an adjudicator
    Verified,
    /// Declined by an adjudicator
    Rejected,
    /// Timed out without a valid adjudication
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two mutually exclusive review actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjudicationAction {
    Verify,
    Reject,
}

impl AdjudicationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Reject => "reject",
        }
    }

    /// Status a pending session moves to when this action is accepted.
    pub fn target_status(&self) -> SessionStatus {
        match self {
            Self::Verify => SessionStatus::Verified,
            Self::Reject => SessionStatus::Rejected,
        }
    }
}

impl fmt::Display for AdjudicationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjudicationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verify" => Ok(Self::Verify),
            "reject" => Ok(Self::Reject),
            other => Err(format!("Unknown action '{}': expected verify or reject", other)),
        }
    }
}

// ============================================================================
// Review surface
// ============================================================================

/// Whether the two review actions can still be clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    Active,
    Disabled,
}

/// Visible mark left on the originating submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Accepted,
    Rejected,
}

impl Mark {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Accepted => "\u{2705}",
            Self::Rejected => "\u{274c}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1,000");
        assert_eq!(format_grouped(12345), "12,345");
        assert_eq!(format_grouped(50000), "50,000");
        assert_eq!(format_grouped(1234567), "1,234,567");
        assert_eq!(format_grouped(9_007_199_254_740_991), "9,007,199,254,740,991");
    }

    #[test]
    fn test_reading_carries_formatted_value() {
        let reading = ExtractedReading::new("Growth Rate: 12,345", 12345);
        assert_eq!(reading.formatted, "12,345");
        assert_eq!(reading.raw_text, "Growth Rate: 12,345");
    }

    #[test]
    fn test_only_pending_is_not_terminal() {
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(SessionStatus::Verified.is_terminal());
        assert!(SessionStatus::Rejected.is_terminal());
        assert!(SessionStatus::Expired.is_terminal());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("Verify".parse::<AdjudicationAction>().unwrap(), AdjudicationAction::Verify);
        assert_eq!(" reject ".parse::<AdjudicationAction>().unwrap(), AdjudicationAction::Reject);
        assert!("approve".parse::<AdjudicationAction>().is_err());
        assert_eq!(AdjudicationAction::Reject.target_status(), SessionStatus::Rejected);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::Expired).unwrap();
        assert_eq!(json, "\"expired\"");
    }
}
