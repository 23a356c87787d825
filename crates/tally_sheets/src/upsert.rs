//! Keyed read-modify-write over a ledger range.

use crate::client::LedgerClient;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// What an upsert did. `row` is the zero-based index within the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpsertAction {
    Updated { row: usize },
    Appended { row: usize },
}

impl UpsertAction {
    pub fn row(&self) -> usize {
        match self {
            Self::Updated { row } | Self::Appended { row } => *row,
        }
    }
}

impl std::fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Updated { row } => write!(f, "updated row {}", row + 1),
            Self::Appended { row } => write!(f, "appended row {}", row + 1),
        }
    }
}

/// Set `key`'s value in `rows`.
///
/// The first row whose first cell equals `key` exactly gets its second cell
/// replaced (the row is extended if it only has a key). Other cells and rows,
/// header included, are left alone. Without a match `[key, value]` is appended.
pub fn apply_upsert(rows: &mut Vec<Vec<String>>, key: &str, value: &str) -> UpsertAction {
    let hit = rows
        .iter()
        .position(|row| row.first().map(String::as_str) == Some(key));

    match hit {
        Some(index) => {
            let row = &mut rows[index];
            if row.len() < 2 {
                row.resize(2, String::new());
            }
            row[1] = value.to_string();
            UpsertAction::Updated { row: index }
        }
        None => {
            rows.push(vec![key.to_string(), value.to_string()]);
            UpsertAction::Appended {
                row: rows.len() - 1,
            }
        }
    }
}

/// Ledger write-through used when a session is verified.
///
/// Not transactional: concurrent upserts race on read-modify-write and the
/// last writer wins.
#[derive(Clone)]
pub struct LedgerSync {
    client: Arc<dyn LedgerClient>,
}

impl LedgerSync {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self { client }
    }

    pub async fn upsert(&self, key: &str, value: u64) -> Result<UpsertAction> {
        let mut rows = self.client.read_range().await?;
        let action = apply_upsert(&mut rows, key, &value.to_string());
        self.client.write_range(&rows).await?;
        info!(key, value, %action, "ledger upserted");
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_append_to_empty() {
        let mut data = Vec::new();
        assert_eq!(
            apply_upsert(&mut data, "Nova", "50000"),
            UpsertAction::Appended { row: 0 }
        );
        assert_eq!(data, rows(&[&["Nova", "50000"]]));
    }

    #[test]
    fn test_update_in_place_keeps_header_and_extra_columns() {
        let mut data = rows(&[
            &["IGN", "GR", "Notes"],
            &["Atlas", "10"],
            &["Nova", "1", "officer"],
        ]);
        let action = apply_upsert(&mut data, "Nova", "50000");
        assert_eq!(action, UpsertAction::Updated { row: 2 });
        assert_eq!(
            data,
            rows(&[
                &["IGN", "GR", "Notes"],
                &["Atlas", "10"],
                &["Nova", "50000", "officer"],
            ])
        );
    }

    #[test]
    fn test_key_only_row_is_extended() {
        let mut data = rows(&[&["Nova"]]);
        assert_eq!(
            apply_upsert(&mut data, "Nova", "7"),
            UpsertAction::Updated { row: 0 }
        );
        assert_eq!(data, rows(&[&["Nova", "7"]]));
    }

    #[test]
    fn test_match_is_exact() {
        let mut data = rows(&[&["nova", "1"], &["Nova ", "2"]]);
        assert_eq!(
            apply_upsert(&mut data, "Nova", "3"),
            UpsertAction::Appended { row: 2 }
        );
        assert_eq!(data[0][1], "1");
        assert_eq!(data[1][1], "2");
    }

    #[test]
    fn test_first_match_wins() {
        let mut data = rows(&[&["Nova", "1"], &["Nova", "2"]]);
        apply_upsert(&mut data, "Nova", "9");
        assert_eq!(data, rows(&[&["Nova", "9"], &["Nova", "2"]]));
    }

    #[test]
    fn test_repeat_upsert_is_idempotent() {
        let mut data = rows(&[&["IGN", "GR"]]);
        apply_upsert(&mut data, "Nova", "50000");
        let once = data.clone();
        let action = apply_upsert(&mut data, "Nova", "50000");
        assert_eq!(action, UpsertAction::Updated { row: 1 });
        assert_eq!(data, once);
    }

    #[test]
    fn test_display() {
        assert_eq!(UpsertAction::Updated { row: 0 }.to_string(), "updated row 1");
        assert_eq!(UpsertAction::Appended { row: 4 }.to_string(), "appended row 5");
    }
}
