//! Map-backed registry.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tally::pipeline::Registry;
use tally_db::{DbError, PlayerRecord};
use tally_protocol::PlayerId;

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: Mutex<HashMap<PlayerId, PlayerRecord>>,
    fail_reads: AtomicBool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get` and `list` fail, as an unreachable store would.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), DbError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DbError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "registry offline",
            )));
        }
        Ok(())
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<PlayerId, PlayerRecord>>, DbError> {
        self.entries
            .lock()
            .map_err(|_| DbError::corrupt("registry lock poisoned"))
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn set(&self, player: &PlayerId, display_name: &str) -> Result<(), DbError> {
        self.entries()?.insert(
            player.clone(),
            PlayerRecord {
                player_id: player.clone(),
                display_name: display_name.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, player: &PlayerId) -> Result<Option<String>, DbError> {
        self.check_reads()?;
        Ok(self
            .entries()?
            .get(player)
            .map(|record| record.display_name.clone()))
    }

    async fn remove(&self, player: &PlayerId) -> Result<bool, DbError> {
        Ok(self.entries()?.remove(player).is_some())
    }

    async fn list(&self) -> Result<Vec<PlayerRecord>, DbError> {
        self.check_reads()?;
        let mut records: Vec<PlayerRecord> = self.entries()?.values().cloned().collect();
        records.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        Ok(records)
    }
}
