/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Result payloads handed back to the caller.
//!
//! ```json
//! {
//!   "success": true,
//!   "timetable": [
//!     { "teacher": "alice", "subject": "CS101", "room": "R101",
//!       "day": "Monday", "start_time": "09:00", "end_time": "10:00" }
//!   ],
//!   "deadlocks": [
//!     { "teacher": "bob", "subject": "MA201", "preferred_day": "Monday",
//!       "start_time": "09:00", "end_time": "10:00",
//!       "reason": "No available room or time slot on any day" }
//!   ]
//! }
//! ```
//!
//! When a run has nothing to work with the single deadlock entry is a plain
//! explanatory string instead of a record.

use chrono::NaiveTime;
use serde::Serialize;

use crate::model::{clock, Assignment, Weekday};
use crate::scheduler::{Allocation, DeadlockReason, DeadlockRecord};

/// One placed session as shown to readers of the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentView {
    pub teacher: String,
    pub subject: String,
    pub room: String,
    pub day: Weekday,
    #[serde(rename = "start_time", with = "clock")]
    pub start: NaiveTime,
    #[serde(rename = "end_time", with = "clock")]
    pub end: NaiveTime,
}

impl From<&Assignment> for AssignmentView {
    fn from(a: &Assignment) -> Self {
        AssignmentView {
            teacher: a.teacher.username.clone(),
            subject: a.subject.code.clone(),
            room: a.room.number.clone(),
            day: a.time_slot.day,
            start: a.time_slot.start,
            end: a.time_slot.end,
        }
    }
}

/// Entry of the report's `deadlocks` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeadlockEntry {
    /// A preference that could not be placed.
    Unplaced(DeadlockRecord),
    /// Run-level explanation (no preferences or no rooms).
    Notice(String),
}

/// Outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// `true` iff at least one session was placed (and committed).
    pub success: bool,
    pub timetable: Vec<AssignmentView>,
    pub deadlocks: Vec<DeadlockEntry>,
}

impl GenerationReport {
    /// The run had no preferences or no rooms.
    pub fn insufficient_input() -> Self {
        GenerationReport {
            success: false,
            timetable: Vec::new(),
            deadlocks: vec![DeadlockEntry::Notice(
                DeadlockReason::InsufficientInput.to_string(),
            )],
        }
    }

    /// Build the report for a finished allocation.
    ///
    /// An allocation with no assignments is a failed run: the timetable is
    /// empty and only the deadlocks are reported.
    pub fn from_allocation(allocation: &Allocation) -> Self {
        GenerationReport {
            success: !allocation.assignments.is_empty(),
            timetable: allocation
                .assignments
                .iter()
                .map(AssignmentView::from)
                .collect(),
            deadlocks: allocation
                .deadlocks
                .iter()
                .cloned()
                .map(DeadlockEntry::Unplaced)
                .collect(),
        }
    }
}

/// The persisted timetable as served to anonymous readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedTimetable {
    pub success: bool,
    pub count: usize,
    pub timetable: Vec<AssignmentView>,
}

impl PublishedTimetable {
    pub fn new(assignments: &[Assignment]) -> Self {
        PublishedTimetable {
            success: true,
            count: assignments.len(),
            timetable: assignments.iter().map(AssignmentView::from).collect(),
        }
    }
}
