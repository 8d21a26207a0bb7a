// Lifecycle and priority resolution for alerts keyed by (department, modality).
// A notification is open until it is confirmed by the department or
// cancelled by the modality; both are terminal. Each (department, modality)
// pair has at most one open notification, and raising a priority for a pair
// that is already open changes that notification in place.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Notification, Priority};
use crate::store;

#[derive(Clone)]
pub struct NotificationLedger {
    pool: SqlitePool,
}

impl NotificationLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a notification for the pair, or re-prioritise the open one.
    ///
    /// `created_at` of an existing open notification is preserved.
    pub async fn raise_priority(
        &self,
        department: &str,
        modality: &str,
        priority: i64,
        now: DateTime<Utc>,
    ) -> Result<Notification> {
        let priority = Priority::try_from(priority).map_err(|e| {
            warn!(department, modality, priority, "Rejected priority request");
            e
        })?;

        let notification =
            store::upsert_open_notification(&self.pool, department, modality, priority, now)
                .await?;

        info!(
            id = %notification.id,
            department,
            modality,
            priority = priority.as_i64(),
            "Raised notification priority"
        );
        Ok(notification)
    }

    /// Cancel the open notification of the pair, if there is one.
    ///
    /// Cancelling a pair with nothing open is a no-op.
    pub async fn cancel(&self, department: &str, modality: &str, now: DateTime<Utc>) -> Result<()> {
        let rows = store::cancel_notification(&self.pool, department, modality, now).await?;

        if rows == 0 {
            debug!(department, modality, "No open notification to cancel");
        } else {
            info!(department, modality, "Cancelled notification");
        }
        Ok(())
    }

    /// Confirm a notification by id.
    ///
    /// Returns the number of notifications confirmed: 0 when the id is unknown
    /// or the notification is already confirmed or cancelled.
    pub async fn confirm(&self, id: &str, now: DateTime<Utc>) -> Result<u64> {
        let rows = store::confirm_notification(&self.pool, id, now).await?;

        if rows == 0 {
            debug!(id, "No open notification to confirm");
        } else {
            info!(id, "Confirmed notification");
        }
        Ok(rows)
    }

    pub async fn get_open(&self, department: &str, modality: &str) -> Result<Option<Notification>> {
        store::get_open_notification(&self.pool, department, modality).await
    }

    /// Open notifications of a department, most urgent first.
    ///
    /// Equal priorities keep creation order, so the earliest alert wins ties.
    pub async fn get_open_ordered_by_priority(&self, department: &str) -> Result<Vec<Notification>> {
        store::list_open_notifications(&self.pool, department).await
    }

    /// The alert the department display shows; `None` means all clear.
    pub async fn current_alert(&self, department: &str) -> Result<Option<Notification>> {
        let open = self.get_open_ordered_by_priority(department).await?;
        Ok(open.into_iter().next())
    }

    /// Confirmed and cancelled notifications of a modality, newest first
    pub async fn get_history(&self, modality: &str) -> Result<Vec<Notification>> {
        store::list_terminal_notifications(&self.pool, modality).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Notification>> {
        store::get_notification(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use crate::error::Error;
    use crate::models::{from_unix, NotificationState};
    use tempfile::{tempdir, TempDir};

    async fn setup() -> (NotificationLedger, TempDir) {
        let temp_dir = tempdir().unwrap();
        let pool = initialize_database(temp_dir.path().join("ledger.db"))
            .await
            .unwrap();
        (NotificationLedger::new(pool), temp_dir)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        from_unix(secs).unwrap()
    }

    #[tokio::test]
    async fn test_raise_creates_open_notification() {
        let (ledger, _dir) = setup().await;

        let created = ledger.raise_priority("abc", "def", 1, at(1000)).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.state(), NotificationState::Open);

        let open = ledger.get_open("abc", "def").await.unwrap().unwrap();
        assert_eq!(open, created);
        assert_eq!(open.priority, Priority::High);
        assert_eq!(open.created_at, at(1000));
    }

    #[tokio::test]
    async fn test_raise_updates_in_place() {
        let (ledger, _dir) = setup().await;

        let first = ledger.raise_priority("abc", "x", 3, at(1000)).await.unwrap();
        let second = ledger.raise_priority("abc", "x", 2, at(1050)).await.unwrap();

        assert_eq!(first.id, second.id);
        let open = ledger.get_open("abc", "x").await.unwrap().unwrap();
        assert_eq!(open.priority, Priority::Medium);
        assert_eq!(open.created_at, at(1000));
        assert_eq!(ledger.get_open_ordered_by_priority("abc").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reprioritised_notification_is_visible_immediately() {
        let (ledger, _dir) = setup().await;

        for i in 0..20 {
            let modality = format!("m{}", i);
            ledger.raise_priority("abc", &modality, 3, at(1000)).await.unwrap();
            ledger.raise_priority("abc", &modality, 1, at(1001)).await.unwrap();

            let open = ledger.get_open("abc", &modality).await.unwrap().unwrap();
            assert_eq!(open.priority, Priority::High, "modality {}", modality);
        }
        assert_eq!(ledger.get_open_ordered_by_priority("abc").await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_raise_rejects_invalid_priority() {
        let (ledger, _dir) = setup().await;

        for invalid in [0, 4, 99] {
            let result = ledger.raise_priority("abc", "x", invalid, at(1000)).await;
            assert!(matches!(result, Err(Error::InvalidPriority(p)) if p == invalid));
        }
        assert!(ledger.get_open("abc", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_without_open_notification_is_noop() {
        let (ledger, _dir) = setup().await;

        ledger.cancel("abc", "x", at(1000)).await.unwrap();
        assert!(ledger.get_open("abc", "x").await.unwrap().is_none());
        assert!(ledger.get_history("x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_is_scoped_to_pair() {
        let (ledger, _dir) = setup().await;

        ledger.raise_priority("abc", "x", 1, at(1000)).await.unwrap();
        ledger.raise_priority("abc", "y", 1, at(1001)).await.unwrap();
        ledger.raise_priority("def", "x", 1, at(1002)).await.unwrap();

        ledger.cancel("abc", "x", at(1005)).await.unwrap();

        assert!(ledger.get_open("abc", "x").await.unwrap().is_none());
        assert!(ledger.get_open("abc", "y").await.unwrap().is_some());
        assert!(ledger.get_open("def", "x").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_confirm_twice() {
        let (ledger, _dir) = setup().await;

        let n = ledger.raise_priority("abc", "x", 2, at(1000)).await.unwrap();

        assert_eq!(ledger.confirm(&n.id, at(1100)).await.unwrap(), 1);
        assert_eq!(ledger.confirm(&n.id, at(1200)).await.unwrap(), 0);

        let stored = ledger.get(&n.id).await.unwrap().unwrap();
        assert_eq!(stored.state(), NotificationState::Confirmed);
        assert_eq!(stored.confirmed_at, Some(at(1100)));
    }

    #[tokio::test]
    async fn test_confirm_unknown_or_cancelled() {
        let (ledger, _dir) = setup().await;

        assert_eq!(ledger.confirm("xxx", at(1000)).await.unwrap(), 0);

        let n = ledger.raise_priority("abc", "x", 2, at(1000)).await.unwrap();
        ledger.cancel("abc", "x", at(1001)).await.unwrap();
        assert_eq!(ledger.confirm(&n.id, at(1002)).await.unwrap(), 0);

        let stored = ledger.get(&n.id).await.unwrap().unwrap();
        assert_eq!(stored.state(), NotificationState::Cancelled);
        assert!(stored.confirmed_at.is_none());
    }

    #[tokio::test]
    async fn test_raise_after_terminal_opens_new_notification() {
        let (ledger, _dir) = setup().await;

        let first = ledger.raise_priority("abc", "x", 1, at(1000)).await.unwrap();
        ledger.confirm(&first.id, at(1010)).await.unwrap();

        let second = ledger.raise_priority("abc", "x", 3, at(1020)).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.created_at, at(1020));
        assert_eq!(ledger.get_history("x").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_ordered_by_priority_then_creation() {
        let (ledger, _dir) = setup().await;

        ledger.raise_priority("abc", "x", 3, at(1000)).await.unwrap();
        ledger.raise_priority("abc", "y", 1, at(1001)).await.unwrap();
        ledger.raise_priority("abc", "z", 2, at(1002)).await.unwrap();
        ledger.raise_priority("abc", "w", 1, at(1003)).await.unwrap();

        let open = ledger.get_open_ordered_by_priority("abc").await.unwrap();
        let order: Vec<(&str, Priority)> = open
            .iter()
            .map(|n| (n.modality.as_str(), n.priority))
            .collect();
        assert_eq!(
            order,
            vec![
                ("y", Priority::High),
                ("w", Priority::High),
                ("z", Priority::Medium),
                ("x", Priority::Low),
            ]
        );

        let current = ledger.current_alert("abc").await.unwrap().unwrap();
        assert_eq!(current.modality, "y");
        assert!(ledger.current_alert("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let (ledger, _dir) = setup().await;

        let a = ledger.raise_priority("aod", "x", 1, at(1000)).await.unwrap();
        ledger.raise_priority("ctd", "x", 2, at(1010)).await.unwrap();
        ledger.raise_priority("msk", "x", 3, at(1020)).await.unwrap();
        ledger.raise_priority("msk", "y", 3, at(1030)).await.unwrap();

        ledger.confirm(&a.id, at(1100)).await.unwrap();
        ledger.cancel("ctd", "x", at(1101)).await.unwrap();
        ledger.cancel("msk", "y", at(1102)).await.unwrap();

        let history = ledger.get_history("x").await.unwrap();
        let departments: Vec<&str> = history.iter().map(|n| n.department.as_str()).collect();
        assert_eq!(departments, vec!["ctd", "aod"]);
        assert!(history.iter().all(|n| !n.is_open()));
    }
}
