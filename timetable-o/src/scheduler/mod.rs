//! Greedy session allocator for Timetable-O.
//!
//! [`GreedyAllocator`] walks the teachers' preferences in rank order and
//! places each one into the first free `(time slot, room)` pair it finds,
//! recording a [`DeadlockRecord`] when nothing fits.  The result is an
//! [`Allocation`] (the buffered assignments plus the deadlock log) ready to
//! be committed by the [`generator`](crate::generator).
//!
//! # Search order per preference
//!
//! | Phase | Slot | Rooms |
//! |---|---|---|
//! | A | the preferred slot | listing order |
//! | B | same clock time, other days, listing order | listing order |
//! | C | none | deadlock recorded, run continues |
//!
//! Phase B is only entered once every room has been tried in phase A.
//! Earlier placements are never revisited, so the outcome depends on the
//! preference order (see [`order_preferences`]).
//!
//! # Example
//! ```rust,ignore
//! let allocator = GreedyAllocator::new(&rooms, &slots);
//! let allocation = allocator.allocate(&preferences);
//! assert!(find_overlaps(&allocation.assignments).is_empty());
//! ```

pub mod availability;
pub mod conflict;
pub mod error;

pub use availability::{AvailabilityTracker, EntityKind};
pub use conflict::{conflicts, find_overlaps, Overlap, OverlapKind};
pub use error::{DeadlockReason, SchedulerError};

use chrono::NaiveTime;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::model::{clock, Assignment, Preference, Room, TimeSlot, Weekday};

// ── Output types ──────────────────────────────────────────────────────────────

/// A preference that could not be placed anywhere.
///
/// Carries the *originally preferred* day and time, not any fallback that was
/// attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlockRecord {
    pub teacher: String,
    pub subject: String,
    pub preferred_day: Weekday,
    #[serde(rename = "start_time", with = "clock")]
    pub start: NaiveTime,
    #[serde(rename = "end_time", with = "clock")]
    pub end: NaiveTime,
    pub reason: DeadlockReason,
}

impl DeadlockRecord {
    fn unplaced(pref: &Preference) -> Self {
        DeadlockRecord {
            teacher: pref.teacher.username.clone(),
            subject: pref.subject.code.clone(),
            preferred_day: pref.time_slot.day,
            start: pref.time_slot.start,
            end: pref.time_slot.end,
            reason: DeadlockReason::NoRoomOrSlot,
        }
    }
}

impl Serialize for DeadlockReason {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Everything one allocation run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Placed sessions, in the order they were placed.
    pub assignments: Vec<Assignment>,
    /// Preferences that could not be placed, in processing order.
    pub deadlocks: Vec<DeadlockRecord>,
}

impl Allocation {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Where a preference ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Phase A: the preferred slot.
    Preferred,
    /// Phase B: same clock time on another day.
    OtherDay,
}

// ── Ordering ──────────────────────────────────────────────────────────────────

/// Sort preferences by `preference_number`, lowest first, across all teachers.
///
/// The sort is stable: equal numbers keep their input order, which makes runs
/// reproducible.
pub fn order_preferences(preferences: &[Preference]) -> Vec<&Preference> {
    let mut ordered: Vec<&Preference> = preferences.iter().collect();
    ordered.sort_by_key(|p| p.preference_number);
    ordered
}

// ── GreedyAllocator ───────────────────────────────────────────────────────────

/// First-fit allocator over a fixed room and time-slot listing.
///
/// Holds only borrowed reference data.  All per-run state (the
/// [`AvailabilityTracker`]) is created inside [`allocate`](Self::allocate) and
/// dropped at the end of the call, so one allocator can serve any number of
/// independent runs.
pub struct GreedyAllocator<'a> {
    rooms: &'a [Room],
    slots: &'a [TimeSlot],
}

impl<'a> GreedyAllocator<'a> {
    pub fn new(rooms: &'a [Room], slots: &'a [TimeSlot]) -> Self {
        Self { rooms, slots }
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Place every preference (in [`order_preferences`] order) or record it as
    /// a deadlock.
    pub fn allocate(&self, preferences: &[Preference]) -> Allocation {
        let mut tracker = AvailabilityTracker::new();
        let mut allocation = Allocation::default();

        info!(
            preference_count = preferences.len(),
            room_count = self.rooms.len(),
            slot_count = self.slots.len(),
            "=== GreedyAllocator::allocate() ==="
        );

        for pref in order_preferences(preferences) {
            match self.place(pref, &mut tracker) {
                Some((assignment, placement)) => {
                    debug!(
                        teacher = %pref.teacher,
                        subject = %pref.subject.code,
                        slot = %assignment.time_slot,
                        room = %assignment.room.number,
                        rank = pref.preference_number,
                        fallback = (placement == Placement::OtherDay),
                        "✓ placed"
                    );
                    allocation.assignments.push(assignment);
                }
                None => {
                    let record = DeadlockRecord::unplaced(pref);
                    warn!(
                        teacher = %record.teacher,
                        subject = %record.subject,
                        preferred = %pref.time_slot,
                        "✗ {}",
                        record.reason
                    );
                    allocation.deadlocks.push(record);
                }
            }
        }

        info!(
            placed = allocation.assignments.len(),
            deadlocks = allocation.deadlocks.len(),
            total = preferences.len(),
            "allocation done"
        );
        allocation
    }

    // ── Phases ────────────────────────────────────────────────────────────────

    fn place(
        &self,
        pref: &Preference,
        tracker: &mut AvailabilityTracker,
    ) -> Option<(Assignment, Placement)> {
        if let Some(assignment) = self.place_in_preferred_slot(pref, tracker) {
            return Some((assignment, Placement::Preferred));
        }
        self.place_on_other_day(pref, tracker)
            .map(|assignment| (assignment, Placement::OtherDay))
    }

    /// Phase A: the preferred slot, first free room.
    fn place_in_preferred_slot(
        &self,
        pref: &Preference,
        tracker: &mut AvailabilityTracker,
    ) -> Option<Assignment> {
        self.claim_first_free_room(pref, &pref.time_slot, tracker)
    }

    /// Phase B: same clock time on the other days, slots then rooms in listing
    /// order.
    fn place_on_other_day(
        &self,
        pref: &Preference,
        tracker: &mut AvailabilityTracker,
    ) -> Option<Assignment> {
        self.slots
            .iter()
            .filter(|alt| pref.time_slot.is_same_time_other_day(alt))
            .find_map(|alt| self.claim_first_free_room(pref, alt, tracker))
    }

    /// Claim the first room in listing order where both the teacher and the
    /// room are free at `slot`.
    fn claim_first_free_room(
        &self,
        pref: &Preference,
        slot: &TimeSlot,
        tracker: &mut AvailabilityTracker,
    ) -> Option<Assignment> {
        let interval = slot.interval();
        let room = self
            .rooms
            .iter()
            .find(|room| tracker.is_free(pref.teacher.id, room.id, &interval))?;

        tracker.claim(pref.teacher.id, room.id, interval);
        Some(Assignment::from_preference(pref, slot, room))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
