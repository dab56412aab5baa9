/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persisted ("active") timetable.
//!
//! The generator only ever writes the schedule through
//! [`ScheduleStore::replace_all`], which must be all-or-nothing: readers see
//! either the previous schedule or the complete new one, never a mix and
//! never an empty table mid-replace.
//!
//! Two backends are provided:
//!
//! * [`SqliteStore`]: the production store, one SQLite transaction per
//!   replace.
//! * [`MemoryStore`]: swaps a `Vec` under a lock; used for dry runs.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::model::Assignment;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A persisted row could not be turned back into an [`Assignment`].
    #[error("stored timetable row {row} is corrupt: {detail}")]
    Corrupt { row: i64, detail: String },
}

/// Storage for the active timetable.
pub trait ScheduleStore: Send + Sync {
    /// Atomically delete every persisted assignment and insert `assignments`.
    ///
    /// On error the previous schedule must remain fully intact.
    fn replace_all(&self, assignments: &[Assignment]) -> Result<(), StoreError>;

    /// Every persisted assignment, in insertion order.
    fn load_all(&self) -> Result<Vec<Assignment>, StoreError>;
}
