//! SQLite-backed player registry for Tally.
//!
//! ```rust,ignore
//! let db = TallyDb::open(tally_protocol::paths::default_registry_path()).await?;
//! db.registry_set(&player, "Nova").await?;
//! assert_eq!(db.registry_get(&player).await?.as_deref(), Some("Nova"));
//! ```

mod error;
mod registry;
mod schema;
mod types;

pub use error::{DbError, Result};
pub use types::PlayerRecord;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the registry database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct TallyDb {
    pool: SqlitePool,
}

impl TallyDb {
    /// Open the database at `path`, creating the file (and parent
    /// directories) and the schema as needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self::connect(file_options(path).create_if_missing(true), MAX_CONNECTIONS).await?;
        info!(path = %path.display(), "registry opened");
        Ok(db)
    }

    /// Like [`TallyDb::open`] but refuses to create a new file.
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DbError::NotFound(format!(
                "registry database {}",
                path.display()
            )));
        }
        Self::connect(file_options(path), MAX_CONNECTIONS).await
    }

    /// Private in-memory database. One connection that is never recycled,
    /// so every query sees the same data.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        Self::connect(options, 1).await
    }

    async fn connect(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn file_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT)
}
