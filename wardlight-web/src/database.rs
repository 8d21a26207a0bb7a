use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the store with the same WAL pool settings `db-exec` uses
    pub async fn new(database_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        info!("Opening database at {}", database_path.display());
        let pool = wardlight_core::create_pool(database_path).await?;

        Ok(Self { pool })
    }

    /// Create the notification and heartbeat tables if they are missing
    pub async fn migrate(&self) -> Result<()> {
        wardlight_core::create_schema(self.pool()).await?;
        if !wardlight_core::verify_schema(self.pool()).await? {
            anyhow::bail!("Database schema verification failed");
        }
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_database_uses_wal_journal() {
        let temp_dir = tempdir().unwrap();
        let db = Database::new(&temp_dir.path().join("nested").join("web.db"))
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(mode.0.to_lowercase(), "wal");
    }
}
