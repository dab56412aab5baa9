/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the Timetable-O scheduler.
//!
//! Two types model the two failure layers:
//!
//! * [`DeadlockReason`]: why a single preference (or the whole run) produced
//!   no placement.  This is *data*, reported to the caller alongside the
//!   timetable; it never aborts a run.
//! * [`SchedulerError`]: a fault returned from
//!   [`TimetableGenerator::generate()`](crate::generator::TimetableGenerator::generate).
//!   When one of these is returned the persisted schedule is unchanged.

use chrono::NaiveTime;
use thiserror::Error;

use crate::model::TimeSlotId;
use crate::store::StoreError;

// ── Deadlocks ─────────────────────────────────────────────────────────────────

/// Why a request could not be placed.
///
/// The `Display` strings are part of the report contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlockReason {
    /// Every room was busy for the preferred slot and for every same-time
    /// slot on the other days (or the teacher was).
    NoRoomOrSlot,

    /// The run had no preferences or no rooms to work with.
    InsufficientInput,
}

impl std::fmt::Display for DeadlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeadlockReason::NoRoomOrSlot => {
                write!(f, "No available room or time slot on any day")
            }
            DeadlockReason::InsufficientInput => {
                write!(f, "No preferences or rooms available.")
            }
        }
    }
}

// ── Top-level scheduler errors ────────────────────────────────────────────────

/// Top-level error type returned by a generation run.
///
/// | Variant | Persisted schedule |
/// |---|---|
/// | `InvalidTimeSlot` | untouched (rejected before allocation) |
/// | `Commit` | untouched (transaction rolled back) |
/// | `Abandoned` | untouched (caller gave up before the commit) |
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A time slot handed to the generator does not satisfy `start < end`.
    #[error("time slot {slot} is invalid: start {start} is not before end {end}")]
    InvalidTimeSlot {
        slot: TimeSlotId,
        start: NaiveTime,
        end: NaiveTime,
    },

    /// The transactional replace of the persisted schedule failed.
    #[error("failed to commit timetable: {0}")]
    Commit(#[from] StoreError),

    /// The caller abandoned the run before its result was committed.
    #[error("run abandoned before commit, active timetable left unchanged")]
    Abandoned,
}
