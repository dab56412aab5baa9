/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Time-conflict analysis.
//!
//! [`conflicts`] is the single predicate every double-booking decision goes
//! through: two intervals clash iff they fall on the same day and their
//! half-open clock ranges overlap.
//!
//! ```text
//! a: [09:00 ──────── 10:00)
//! b:              [09:30 ──────── 10:30)     → conflict
//! c:                     [10:00 ── 11:00)    → no conflict (touching ends)
//! ```
//!
//! [`find_overlaps`] applies the same predicate to a finished set of
//! assignments.  It runs after every allocation as an audit; the allocator
//! guarantees the result is empty, so a non-empty result is logged as a bug.

use crate::model::{Assignment, Interval};

// ── Public API ────────────────────────────────────────────────────────────────

/// `true` iff `a` and `b` are on the same day and overlap in time.
pub fn conflicts(a: &Interval, b: &Interval) -> bool {
    a.day == b.day && a.start < b.end && b.start < a.end
}

/// Which shared resource two overlapping assignments collide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    Teacher,
    Room,
}

/// A pair of assignments (by index into the audited slice) that violate the
/// no-double-booking invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub kind: OverlapKind,
    pub first: usize,
    pub second: usize,
}

/// Return every teacher or room double-booking in `assignments`.
///
/// Quadratic in the number of assignments, which is bounded by the number of
/// weekly sessions.
pub fn find_overlaps(assignments: &[Assignment]) -> Vec<Overlap> {
    let mut found = Vec::new();
    for (i, a) in assignments.iter().enumerate() {
        for (j, b) in assignments.iter().enumerate().skip(i + 1) {
            if !conflicts(&a.time_slot.interval(), &b.time_slot.interval()) {
                continue;
            }
            if a.teacher.id == b.teacher.id {
                found.push(Overlap {
                    kind: OverlapKind::Teacher,
                    first: i,
                    second: j,
                });
            }
            if a.room.id == b.room.id {
                found.push(Overlap {
                    kind: OverlapKind::Room,
                    first: i,
                    second: j,
                });
            }
        }
    }
    found
}

// ── Tests ─────────────────────────────────────────────────────────────────────
