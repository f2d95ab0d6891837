use crate::error::{EngineError, EngineResult};
use std::time::{Duration, Instant};

/// Point in time after which an operation must give up without writing.
/// A timeout too large to represent never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Deadline(Instant::now().checked_add(timeout))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.0, Some(at) if Instant::now() >= at)
    }

    pub fn check(&self) -> EngineResult<()> {
        if self.is_expired() {
            return Err(EngineError::Unavailable(
                "request deadline expired".to_string(),
            ));
        }
        Ok(())
    }
}
