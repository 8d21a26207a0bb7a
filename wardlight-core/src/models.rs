// Data model for alerts raised by imaging modalities and device heartbeats

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::Error;

/// Urgency of an alert; a lower number is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// CSS modifier used by the HTML views.
    pub fn css_class(self) -> &'static str {
        match self {
            Priority::High => "is-danger",
            Priority::Medium => "is-warning",
            Priority::Low => "is-info",
        }
    }

    /// Label shown to ward staff.
    pub fn display_name(self) -> &'static str {
        match self {
            Priority::High => "Hoch",
            Priority::Medium => "Mittel",
            Priority::Low => "Tief",
        }
    }

    /// Token understood by the signal device firmware.
    pub fn device_code(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl TryFrom<i64> for Priority {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(Error::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.as_i64()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// Lifecycle position of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationState {
    Open,
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for NotificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationState::Open => write!(f, "open"),
            NotificationState::Confirmed => write!(f, "confirmed"),
            NotificationState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One alert raised by a modality for a department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub department: String,
    pub modality: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn state(&self) -> NotificationState {
        match (self.confirmed_at, self.cancelled_at) {
            (Some(_), _) => NotificationState::Confirmed,
            (None, Some(_)) => NotificationState::Cancelled,
            (None, None) => NotificationState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == NotificationState::Open
    }

    /// When the notification left the open state, if it has.
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at.or(self.cancelled_at)
    }
}

impl sqlx::FromRow<'_, SqliteRow> for Notification {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let priority: i64 = row.try_get("priority")?;
        let priority = Priority::try_from(priority).map_err(|e| decode_error("priority", e))?;

        Ok(Notification {
            id: row.try_get("id")?,
            department: row.try_get("department")?,
            modality: row.try_get("modality")?,
            priority,
            created_at: timestamp_column(row, "created_at")?,
            confirmed_at: optional_timestamp_column(row, "confirmed_at")?,
            cancelled_at: optional_timestamp_column(row, "cancelled_at")?,
        })
    }
}

/// Most recent liveness report of a department's signal device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    pub department: String,
    pub reported_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, SqliteRow> for HeartbeatRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(HeartbeatRecord {
            department: row.try_get("department")?,
            reported_at: timestamp_column(row, "reported_at")?,
        })
    }
}

/// Timestamps are stored as whole unix seconds.
pub(crate) fn to_unix(ts: DateTime<Utc>) -> i64 {
    ts.timestamp()
}

pub(crate) fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

fn timestamp_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let secs: i64 = row.try_get(column)?;
    from_unix(secs).ok_or_else(|| out_of_range(column, secs))
}

fn optional_timestamp_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let secs: Option<i64> = row.try_get(column)?;
    secs.map(|s| from_unix(s).ok_or_else(|| out_of_range(column, s)))
        .transpose()
}

fn out_of_range(column: &str, secs: i64) -> sqlx::Error {
    decode_error(column, format!("timestamp {} out of range", secs))
}

fn decode_error(column: &str, err: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            err.to_string(),
        )),
    }
}
