//! Display-name registry seam.

use async_trait::async_trait;
use tally_db::{DbError, PlayerRecord, TallyDb};
use tally_protocol::PlayerId;

#[async_trait]
pub trait Registry: Send + Sync {
    async fn set(&self, player: &PlayerId, display_name: &str) -> Result<(), DbError>;
    async fn get(&self, player: &PlayerId) -> Result<Option<String>, DbError>;
    /// Returns whether an entry existed.
    async fn remove(&self, player: &PlayerId) -> Result<bool, DbError>;
    /// All entries ordered by display name.
    async fn list(&self) -> Result<Vec<PlayerRecord>, DbError>;
}

#[async_trait]
impl Registry for TallyDb {
    async fn set(&self, player: &PlayerId, display_name: &str) -> Result<(), DbError> {
        self.registry_set(player, display_name).await
    }

    async fn get(&self, player: &PlayerId) -> Result<Option<String>, DbError> {
        self.registry_get(player).await
    }

    async fn remove(&self, player: &PlayerId) -> Result<bool, DbError> {
        self.registry_remove(player).await
    }

    async fn list(&self) -> Result<Vec<PlayerRecord>, DbError> {
        self.registry_list().await
    }
}
