// Persistence operations over the shared SQLite store.
//
// Each function is a single statement; callers compose them. Terminal
// timestamps are NULL while a notification is open.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{to_unix, HeartbeatRecord, Notification, Priority};

const NOTIFICATION_COLUMNS: &str =
    "id, department, modality, priority, created_at, confirmed_at, cancelled_at";

const OPEN: &str = "confirmed_at IS NULL AND cancelled_at IS NULL";

/// Insert a new open notification and return its generated id
pub async fn create_notification(
    pool: &SqlitePool,
    department: &str,
    modality: &str,
    priority: Priority,
    created_at: DateTime<Utc>,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO notifications (id, department, modality, priority, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&id)
    .bind(department)
    .bind(modality)
    .bind(priority.as_i64())
    .bind(to_unix(created_at))
    .execute(pool)
    .await?;

    Ok(id)
}

/// Change the priority of a notification, returning rows affected
pub async fn update_notification_priority(
    pool: &SqlitePool,
    id: &str,
    priority: Priority,
) -> Result<u64> {
    let result = sqlx::query("UPDATE notifications SET priority = ?1 WHERE id = ?2")
        .bind(priority.as_i64())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Insert an open notification for the pair, or update the priority of the
/// one already open, in a single statement.
///
/// The conflict target is the partial unique index over open rows, so
/// concurrent callers cannot both insert.
pub async fn upsert_open_notification(
    pool: &SqlitePool,
    department: &str,
    modality: &str,
    priority: Priority,
    now: DateTime<Utc>,
) -> Result<Notification> {
    let sql = format!(
        "INSERT INTO notifications (id, department, modality, priority, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT (department, modality) WHERE {OPEN} \
         DO UPDATE SET priority = excluded.priority \
         RETURNING {NOTIFICATION_COLUMNS}"
    );

    // fetch_all steps the statement to completion so the write commits
    let notification = sqlx::query_as::<_, Notification>(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(department)
        .bind(modality)
        .bind(priority.as_i64())
        .bind(to_unix(now))
        .fetch_all(pool)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok(notification)
}

pub async fn get_open_notification(
    pool: &SqlitePool,
    department: &str,
    modality: &str,
) -> Result<Option<Notification>> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
         WHERE department = ?1 AND modality = ?2 AND {OPEN}"
    );

    let notification = sqlx::query_as::<_, Notification>(&sql)
        .bind(department)
        .bind(modality)
        .fetch_optional(pool)
        .await?;

    Ok(notification)
}

pub async fn get_notification(pool: &SqlitePool, id: &str) -> Result<Option<Notification>> {
    let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1");

    let notification = sqlx::query_as::<_, Notification>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(notification)
}

/// Open notifications of a department, most urgent first, then oldest first
pub async fn list_open_notifications(
    pool: &SqlitePool,
    department: &str,
) -> Result<Vec<Notification>> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
         WHERE department = ?1 AND {OPEN} \
         ORDER BY priority ASC, rowid ASC"
    );

    let notifications = sqlx::query_as::<_, Notification>(&sql)
        .bind(department)
        .fetch_all(pool)
        .await?;

    Ok(notifications)
}

/// Confirmed or cancelled notifications of a modality, newest first
pub async fn list_terminal_notifications(
    pool: &SqlitePool,
    modality: &str,
) -> Result<Vec<Notification>> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
         WHERE modality = ?1 AND (confirmed_at IS NOT NULL OR cancelled_at IS NOT NULL) \
         ORDER BY created_at DESC, rowid DESC"
    );

    let notifications = sqlx::query_as::<_, Notification>(&sql)
        .bind(modality)
        .fetch_all(pool)
        .await?;

    Ok(notifications)
}

/// Cancel the open notification of the pair; terminal rows are untouched
pub async fn cancel_notification(
    pool: &SqlitePool,
    department: &str,
    modality: &str,
    cancelled_at: DateTime<Utc>,
) -> Result<u64> {
    let sql = format!(
        "UPDATE notifications SET cancelled_at = ?1 \
         WHERE department = ?2 AND modality = ?3 AND {OPEN}"
    );

    let result = sqlx::query(&sql)
        .bind(to_unix(cancelled_at))
        .bind(department)
        .bind(modality)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Confirm a notification by id if it is still open, returning rows affected
pub async fn confirm_notification(
    pool: &SqlitePool,
    id: &str,
    confirmed_at: DateTime<Utc>,
) -> Result<u64> {
    let sql = format!("UPDATE notifications SET confirmed_at = ?1 WHERE id = ?2 AND {OPEN}");

    let result = sqlx::query(&sql)
        .bind(to_unix(confirmed_at))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Record a heartbeat, replacing any earlier one for the department
pub async fn upsert_heartbeat(
    pool: &SqlitePool,
    department: &str,
    reported_at: DateTime<Utc>,
) -> Result<HeartbeatRecord> {
    let record = sqlx::query_as::<_, HeartbeatRecord>(
        "INSERT INTO heartbeats (department, reported_at) VALUES (?1, ?2) \
         ON CONFLICT (department) DO UPDATE SET reported_at = excluded.reported_at \
         RETURNING department, reported_at",
    )
    .bind(department)
    .bind(to_unix(reported_at))
    .fetch_all(pool)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;

    Ok(record)
}

/// Heartbeat of the department if it was reported strictly within `window_secs` of `now`.
///
/// Both sides are compared in whole seconds.
pub async fn get_heartbeat_if_fresh(
    pool: &SqlitePool,
    department: &str,
    now: DateTime<Utc>,
    window_secs: i64,
) -> Result<Option<HeartbeatRecord>> {
    let record = sqlx::query_as::<_, HeartbeatRecord>(
        "SELECT department, reported_at FROM heartbeats \
         WHERE department = ?1 AND reported_at > ?2",
    )
    .bind(department)
    .bind(to_unix(now) - window_secs)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
