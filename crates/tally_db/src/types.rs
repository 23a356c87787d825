//! Registry row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_ids::PlayerId;

/// A player's declared in-game name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub display_name: String,
    pub updated_at: DateTime<Utc>,
}
