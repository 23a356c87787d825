use crate::error::Result;
use crate::TallyDb;

/// `members`: chat user id -> in-game name, with last-write time in epoch millis.
const MEMBERS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    id TEXT PRIMARY KEY,
    ign TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)"#;

impl TallyDb {
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(MEMBERS_DDL).execute(&self.pool).await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_ign ON members(ign)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
