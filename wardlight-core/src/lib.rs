// Wardlight core: notification ledger and signal device liveness
//
// Modalities raise prioritised alerts for departments; each department's
// display and signal device show the most urgent open alert, and the device
// reports heartbeats so the ward can tell whether the light is actually on.

pub mod database;
pub mod db_path;
pub mod error;
pub mod ledger;
pub mod liveness;
pub mod models;
pub mod store;

pub use database::{create_pool, create_schema, execute_script, initialize_database, verify_schema};
pub use error::{Error, Result};
pub use ledger::NotificationLedger;
pub use liveness::{LivenessTracker, FRESHNESS_WINDOW_SECONDS};
pub use models::{HeartbeatRecord, Notification, NotificationState, Priority};
