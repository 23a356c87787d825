//! Identifier newtypes for Tally.
//!
//! Session ids are minted here (UUID v4) and double as the address of the
//! posted review card. Player and submission ids come from the chat gateway
//! and are opaque, non-empty strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    kind: &'static str,
    reason: String,
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.reason)
    }
}

impl std::error::Error for IdParseError {}

/// Identity of one verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, IdParseError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|e| IdParseError {
                kind: "session ID",
                reason: e.to_string(),
            })
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SessionId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Gateway-supplied string id. Trimmed; empty is rejected, including when
/// deserializing.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                match value.trim() {
                    "" => Err(IdParseError {
                        kind: $kind,
                        reason: "empty".to_string(),
                    }),
                    trimmed => Ok(Self(trimmed.to_string())),
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

opaque_id!(
    /// Chat user (submitter or adjudicator).
    PlayerId,
    "player ID"
);
opaque_id!(
    /// The chat message carrying the screenshot.
    SubmissionId,
    "submission ID"
);

impl PlayerId {
    /// Chat mention form used in review cards and notices.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display_parses_back() {
        let id = SessionId::new();
        assert_eq!(SessionId::parse(&id.to_string()).unwrap(), id);
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn test_session_id_rejects_garbage() {
        let err = SessionId::parse("button2").unwrap_err();
        assert!(err.to_string().starts_with("Invalid session ID"));
    }

    #[test]
    fn test_player_id_trims_and_rejects_empty() {
        let id: PlayerId = " 1379719411534925917 ".parse().unwrap();
        assert_eq!(id.as_str(), "1379719411534925917");
        assert_eq!(id.mention(), "<@1379719411534925917>");
        assert!(PlayerId::parse("   ").is_err());
    }

    #[test]
    fn test_serde_validates_opaque_ids() {
        let id: SubmissionId = serde_json::from_str("\"msg-42\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"msg-42\"");
        assert!(serde_json::from_str::<PlayerId>("\"\"").is_err());
    }

    #[test]
    fn test_session_id_serializes_as_string() {
        let id = SessionId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        assert_eq!(serde_json::from_str::<SessionId>(&json).unwrap(), id);
    }
}
