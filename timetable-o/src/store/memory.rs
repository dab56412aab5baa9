//! In-process timetable store.

use std::sync::{Mutex, PoisonError};

use crate::model::Assignment;

use super::{ScheduleStore, StoreError};

/// Keeps the active timetable in memory.  The replace is a single `Vec` swap
/// under the lock, so it is trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Assignment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleStore for MemoryStore {
    fn replace_all(&self, assignments: &[Assignment]) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        *rows = assignments.to_vec();
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
