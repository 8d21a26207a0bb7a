// Heartbeat recording for the signal devices mounted in each department.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::models::HeartbeatRecord;
use crate::store;

/// A device is alive if it reported strictly less than this many seconds ago.
pub const FRESHNESS_WINDOW_SECONDS: i64 = 300;

#[derive(Clone)]
pub struct LivenessTracker {
    pool: SqlitePool,
}

impl LivenessTracker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store `now` as the latest heartbeat of the department's device
    pub async fn record_heartbeat(
        &self,
        department: &str,
        now: DateTime<Utc>,
    ) -> Result<HeartbeatRecord> {
        let record = store::upsert_heartbeat(&self.pool, department, now).await?;
        debug!(department, reported_at = %record.reported_at, "Recorded heartbeat");
        Ok(record)
    }

    /// The department's heartbeat if it is fresh at `now`.
    ///
    /// A heartbeat exactly `FRESHNESS_WINDOW_SECONDS` old is stale. Ages are
    /// whole seconds: both timestamps are truncated before comparing.
    pub async fn is_alive(
        &self,
        department: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<HeartbeatRecord>> {
        store::get_heartbeat_if_fresh(&self.pool, department, now, FRESHNESS_WINDOW_SECONDS).await
    }
}
