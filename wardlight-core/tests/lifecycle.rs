// End-to-end ledger and liveness scenarios against a real SQLite file

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use wardlight_core::{
    initialize_database, LivenessTracker, NotificationLedger, NotificationState, Priority,
};

async fn setup() -> (NotificationLedger, LivenessTracker, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let pool = initialize_database(temp_dir.path().join("wardlight.db"))
        .await
        .expect("Failed to initialize test database");

    (
        NotificationLedger::new(pool.clone()),
        LivenessTracker::new(pool),
        temp_dir,
    )
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

#[tokio::test]
async fn test_raise_then_cancel_lands_in_history() {
    let (ledger, _tracker, _dir) = setup().await;

    ledger.raise_priority("abc", "x", 1, at(1000)).await.unwrap();

    let open = ledger.get_open("abc", "x").await.unwrap().unwrap();
    assert_eq!(open.priority, Priority::High);
    assert_eq!(open.created_at, at(1000));

    ledger.cancel("abc", "x", at(1005)).await.unwrap();
    assert!(ledger.get_open("abc", "x").await.unwrap().is_none());

    let history = ledger.get_history("x").await.unwrap();
    let for_abc: Vec<_> = history.iter().filter(|n| n.department == "abc").collect();
    assert_eq!(for_abc.len(), 1);
    assert_eq!(for_abc[0].cancelled_at, Some(at(1005)));
    assert!(for_abc[0].confirmed_at.is_none());
    assert_eq!(for_abc[0].state(), NotificationState::Cancelled);
}

#[tokio::test]
async fn test_departments_are_isolated() {
    let (ledger, _tracker, _dir) = setup().await;

    let t = 5000;
    for (offset, department) in ["aod", "ctd", "msk"].iter().enumerate() {
        ledger
            .raise_priority(department, "y", 2, at(t + 5 * offset as i64))
            .await
            .unwrap();
    }

    for (offset, department) in ["aod", "ctd", "msk"].iter().enumerate() {
        let open = ledger.get_open_ordered_by_priority(department).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].department, *department);
        assert_eq!(open[0].modality, "y");
        assert_eq!(open[0].created_at, at(t + 5 * offset as i64));
    }
}

#[tokio::test]
async fn test_urgent_alert_is_not_suppressed_by_earlier_low_one() {
    let (ledger, _tracker, _dir) = setup().await;

    ledger.raise_priority("abc", "x", 3, at(1000)).await.unwrap();
    ledger.raise_priority("abc", "y", 1, at(1001)).await.unwrap();
    ledger.raise_priority("abc", "z", 2, at(1002)).await.unwrap();

    let priorities: Vec<Priority> = ledger
        .get_open_ordered_by_priority("abc")
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.priority)
        .collect();
    assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);

    // Confirming the urgent alert hands the display to the next one
    let current = ledger.current_alert("abc").await.unwrap().unwrap();
    ledger.confirm(&current.id, at(1010)).await.unwrap();
    let next = ledger.current_alert("abc").await.unwrap().unwrap();
    assert_eq!(next.priority, Priority::Medium);
}

#[tokio::test]
async fn test_concurrent_raises_keep_single_open_row() {
    let (ledger, _tracker, _dir) = setup().await;

    let mut handles = Vec::new();
    for priority in [1, 2, 3, 1, 2, 3] {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.raise_priority("abc", "x", priority, at(1000)).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(ledger.get_open_ordered_by_priority("abc").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_heartbeat_freshness_boundary() {
    let (_ledger, tracker, _dir) = setup().await;

    tracker.record_heartbeat("abc", at(1000)).await.unwrap();
    assert!(tracker.is_alive("abc", at(1299)).await.unwrap().is_some());
    assert!(tracker.is_alive("abc", at(1300)).await.unwrap().is_none());

    tracker.record_heartbeat("abc", at(1300)).await.unwrap();
    assert!(tracker.is_alive("abc", at(1300)).await.unwrap().is_some());
}
