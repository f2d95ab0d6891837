use crate::deadline::Deadline;
use crate::error::{EngineError, EngineResult};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared handler state. The connection mutex is held for the whole of one
/// engine operation, so operations never interleave.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub database: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(conn: Connection, database: Option<PathBuf>) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            database,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Runs `f` against the connection on the blocking pool. The blocking
    /// task outlives a timed-out request, so it re-checks `deadline` once it
    /// holds the lock.
    pub async fn with_conn<T, F>(&self, deadline: Deadline, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Connection) -> EngineResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| EngineError::Unavailable("database lock poisoned".to_string()))?;
            deadline.check()?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| EngineError::Unavailable(format!("database task failed: {}", e)))?
    }
}
