use thiserror::Error;

/// Errors raised by the notification ledger and the liveness tracker.
///
/// Absence is never an error here: a missing open notification or a stale
/// heartbeat come back as `Ok(None)`, and confirming a notification that is no
/// longer open comes back as zero rows affected.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid priority {0}: expected 1 (high), 2 (medium) or 3 (low)")]
    InvalidPriority(i64),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("store I/O error: {0}")]
    StoreIo(#[source] sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Error::StoreUnavailable(err),
            other => Error::StoreIo(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
