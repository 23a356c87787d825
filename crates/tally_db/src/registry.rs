//! Player registry operations (player id -> in-game name).

use crate::error::{DbError, Result};
use crate::types::PlayerRecord;
use crate::TallyDb;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tally_ids::PlayerId;
use tracing::debug;

impl TallyDb {
    /// Set (or overwrite) the display name for a player.
    pub async fn registry_set(&self, player: &PlayerId, display_name: &str) -> Result<()> {
        let now = Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO members (id, ign, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                ign = excluded.ign,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(player.as_str())
        .bind(display_name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(player = %player, display_name, "Registry entry set");
        Ok(())
    }

    /// Get the display name for a player, if one is registered.
    pub async fn registry_get(&self, player: &PlayerId) -> Result<Option<String>> {
        let row = sqlx::query("SELECT ign FROM members WHERE id = ?")
            .bind(player.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get::<String, _>("ign")))
    }

    /// Get the full record for a player.
    pub async fn registry_record(&self, player: &PlayerId) -> Result<Option<PlayerRecord>> {
        let row = sqlx::query("SELECT id, ign, updated_at FROM members WHERE id = ?")
            .bind(player.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    /// Remove a player's entry. Returns whether a row existed.
    pub async fn registry_remove(&self, player: &PlayerId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(player.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all registered players, ordered by display name.
    pub async fn registry_list(&self) -> Result<Vec<PlayerRecord>> {
        let rows = sqlx::query("SELECT id, ign, updated_at FROM members ORDER BY ign, id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DbError::corrupt(format!("members.updated_at out of range: {}", millis)))
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<PlayerRecord> {
    let raw_id: String = row.get("id");
    let player_id = PlayerId::parse(&raw_id)
        .map_err(|e| DbError::corrupt(format!("members.id '{}': {}", raw_id, e)))?;

    Ok(PlayerRecord {
        player_id,
        display_name: row.get("ign"),
        updated_at: millis_to_datetime(row.get("updated_at"))?,
    })
}
