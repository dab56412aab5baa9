/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end generation run: allocate → audit → commit → report.
//!
//! [`TimetableGenerator`] owns the persisted-schedule backend and a run-level
//! lock.  Every call to [`generate`](TimetableGenerator::generate) holds that
//! lock from the first allocation step until the commit has finished, so two
//! runs never interleave their replaces of the active timetable.
//!
//! The store is only touched once, at the very end of a successful run.  A
//! run that fails, places nothing, or is abandoned by its caller leaves the
//! previous schedule exactly as it was.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info, warn};

use crate::model::{Preference, Room, TimeSlot};
use crate::report::{GenerationReport, PublishedTimetable};
use crate::scheduler::{find_overlaps, GreedyAllocator, SchedulerError};
use crate::snapshot::Snapshot;
use crate::store::{ScheduleStore, StoreError};

pub struct TimetableGenerator {
    store: Arc<dyn ScheduleStore>,
    run_lock: Mutex<()>,
    abandoned: AtomicBool,
}

impl TimetableGenerator {
    /// Create a generator that commits into `store`.
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self {
            store,
            run_lock: Mutex::new(()),
            abandoned: AtomicBool::new(false),
        }
    }

    /// Stop this generator from committing.  A run already past its commit
    /// is not affected; every later commit attempt fails with
    /// [`SchedulerError::Abandoned`].
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::SeqCst);
    }

    /// Run the full pipeline over a loaded snapshot.
    pub fn generate_from_snapshot(
        &self,
        snapshot: &Snapshot,
    ) -> Result<GenerationReport, SchedulerError> {
        self.generate(&snapshot.preferences, &snapshot.rooms, &snapshot.time_slots)
    }

    /// Allocate `preferences` over `rooms` × `slots`, replace the persisted
    /// schedule on success, and report the outcome.
    ///
    /// `success == false` is a normal outcome (no input, or nothing could be
    /// placed) and leaves the store untouched.
    ///
    /// # Errors
    /// * [`SchedulerError::InvalidTimeSlot`]: a slot with `start >= end`.
    /// * [`SchedulerError::Commit`]: the store rejected the replace; the
    ///   previous schedule is intact.
    /// * [`SchedulerError::Abandoned`]: [`abandon`](Self::abandon) was called
    ///   before the commit.
    pub fn generate(
        &self,
        preferences: &[Preference],
        rooms: &[Room],
        slots: &[TimeSlot],
    ) -> Result<GenerationReport, SchedulerError> {
        let _run = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // ── Preconditions ─────────────────────────────────────────────────────
        if preferences.is_empty() || rooms.is_empty() {
            warn!(
                preferences = preferences.len(),
                rooms = rooms.len(),
                "nothing to schedule"
            );
            return Ok(GenerationReport::insufficient_input());
        }
        let preferred = preferences.iter().map(|p| &p.time_slot);
        if let Some(bad) = slots.iter().chain(preferred).find(|s| s.start >= s.end) {
            return Err(SchedulerError::InvalidTimeSlot {
                slot: bad.id,
                start: bad.start,
                end: bad.end,
            });
        }

        // ── Allocation ────────────────────────────────────────────────────────
        let allocation = GreedyAllocator::new(rooms, slots).allocate(preferences);

        for overlap in find_overlaps(&allocation.assignments) {
            error!(
                kind = ?overlap.kind,
                first = %allocation.assignments[overlap.first],
                second = %allocation.assignments[overlap.second],
                "double booking in allocation output"
            );
        }

        if allocation.is_empty() {
            warn!(
                deadlocks = allocation.deadlocks.len(),
                "no preference could be placed, keeping the current timetable"
            );
            return Ok(GenerationReport::from_allocation(&allocation));
        }

        // ── Commit ────────────────────────────────────────────────────────────
        if self.abandoned.load(Ordering::SeqCst) {
            warn!("run abandoned by caller, keeping the current timetable");
            return Err(SchedulerError::Abandoned);
        }
        self.store.replace_all(&allocation.assignments)?;

        info!(
            committed = allocation.assignments.len(),
            deadlocks = allocation.deadlocks.len(),
            "=== Timetable committed ==="
        );
        Ok(GenerationReport::from_allocation(&allocation))
    }

    /// The currently persisted timetable.
    pub fn published(&self) -> Result<PublishedTimetable, StoreError> {
        let rows = self.store.load_all()?;
        Ok(PublishedTimetable::new(&rows))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Subject, Teacher, Weekday};
    use crate::report::DeadlockEntry;
    use crate::store::{MemoryStore, SqliteStore};
    use chrono::NaiveTime;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    // ── Test helpers ──────────────────────────────────────────────────────────

    fn slot(id: u32, day: Weekday, start: u32, end: u32) -> TimeSlot {
        TimeSlot {
            id,
            day,
            start: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
        }
    }

    fn room(id: u32, number: &str) -> Room {
        Room {
            id,
            number: number.into(),
            capacity: None,
        }
    }

    fn pref(teacher_id: u32, subject_code: &str, slot: &TimeSlot, rank: i32) -> Preference {
        Preference {
            teacher: Teacher {
                id: teacher_id,
                username: format!("T{teacher_id}"),
                short_form: None,
            },
            subject: Subject {
                id: 1,
                code: subject_code.into(),
                name: subject_code.into(),
            },
            semester: 1,
            time_slot: slot.clone(),
            preference_number: rank,
        }
    }

    /// T1 asks twice for Mon 09–10; Tue 09–10 exists as a fallback.
    fn two_preference_scenario() -> (Vec<Preference>, Vec<Room>, Vec<TimeSlot>) {
        let slots = vec![
            slot(1, Weekday::Monday, 9, 10),
            slot(2, Weekday::Tuesday, 9, 10),
        ];
        let rooms = vec![room(1, "R1"), room(2, "R2")];
        let prefs = vec![pref(1, "S1", &slots[0], 1), pref(1, "S2", &slots[0], 2)];
        (prefs, rooms, slots)
    }

    fn memory_generator() -> (Arc<MemoryStore>, TimetableGenerator) {
        let store = Arc::new(MemoryStore::new());
        let generator = TimetableGenerator::new(store.clone());
        (store, generator)
    }

    /// Store whose replace always fails, counting attempts.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        attempts: AtomicUsize,
    }

    impl ScheduleStore for FailingStore {
        fn replace_all(&self, _assignments: &[Assignment]) -> Result<(), StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        }

        fn load_all(&self) -> Result<Vec<Assignment>, StoreError> {
            self.inner.load_all()
        }
    }

    /// Store that fails the test if two replaces ever overlap in time.
    #[derive(Default)]
    struct OverlapDetectingStore {
        inner: MemoryStore,
        in_replace: AtomicBool,
        overlapped: AtomicBool,
    }

    impl ScheduleStore for OverlapDetectingStore {
        fn replace_all(&self, assignments: &[Assignment]) -> Result<(), StoreError> {
            if self.in_replace.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(5));
            let result = self.inner.replace_all(assignments);
            self.in_replace.store(false, Ordering::SeqCst);
            result
        }

        fn load_all(&self) -> Result<Vec<Assignment>, StoreError> {
            self.inner.load_all()
        }
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn second_preference_lands_on_tuesday_and_is_committed() {
        let (store, generator) = memory_generator();
        let (prefs, rooms, slots) = two_preference_scenario();

        let report = generator.generate(&prefs, &rooms, &slots).unwrap();

        assert!(report.success);
        assert!(report.deadlocks.is_empty());
        assert_eq!(report.timetable.len(), 2);
        assert_eq!(report.timetable[0].room, "R1");
        assert_eq!(report.timetable[0].day, Weekday::Monday);
        assert_eq!(report.timetable[1].day, Weekday::Tuesday);

        let stored = store.load_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].subject.code, "S2");
    }

    #[test]
    fn single_room_without_fallback_day_reports_deadlock() {
        let (_store, generator) = memory_generator();
        let slots = vec![slot(1, Weekday::Monday, 9, 10)];
        let rooms = vec![room(1, "R1")];
        let prefs = vec![pref(1, "S1", &slots[0], 1), pref(1, "S2", &slots[0], 2)];

        let report = generator.generate(&prefs, &rooms, &slots).unwrap();

        assert!(report.success, "one placement is still a successful run");
        assert_eq!(report.timetable.len(), 1);
        match &report.deadlocks[..] {
            [DeadlockEntry::Unplaced(record)] => {
                assert_eq!(record.subject, "S2");
                assert_eq!(
                    record.reason.to_string(),
                    "No available room or time slot on any day"
                );
            }
            other => panic!("expected one unplaced record, got {other:?}"),
        }
    }

    #[test]
    fn zero_rooms_fails_without_touching_the_store() {
        let (store, generator) = memory_generator();
        let (prefs, rooms, slots) = two_preference_scenario();
        generator.generate(&prefs, &rooms, &slots).unwrap();
        let before = store.load_all().unwrap();

        let report = generator.generate(&prefs, &[], &slots).unwrap();

        assert_eq!(report, GenerationReport::insufficient_input());
        assert_eq!(store.load_all().unwrap(), before);
    }

    #[test]
    fn zero_preferences_fails_with_notice() {
        let (store, generator) = memory_generator();
        let (_, rooms, slots) = two_preference_scenario();

        let report = generator.generate(&[], &rooms, &slots).unwrap();

        assert!(!report.success);
        assert!(report.timetable.is_empty());
        assert_eq!(
            report.deadlocks,
            vec![DeadlockEntry::Notice(
                "No preferences or rooms available.".into()
            )]
        );
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn insufficient_input_wins_over_invalid_slot() {
        let (store, generator) = memory_generator();
        let bad = slot(9, Weekday::Friday, 11, 10);

        let report = generator.generate(&[], &[], &[bad]).unwrap();

        assert_eq!(report, GenerationReport::insufficient_input());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn abandoned_generator_does_not_commit() {
        let (store, generator) = memory_generator();
        let (prefs, rooms, slots) = two_preference_scenario();

        generator.abandon();
        let err = generator.generate(&prefs, &rooms, &slots).unwrap_err();

        assert!(matches!(err, SchedulerError::Abandoned));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn commit_failure_propagates_and_keeps_previous_schedule() {
        let store = Arc::new(FailingStore::default());
        let generator = TimetableGenerator::new(store.clone());
        let (prefs, rooms, slots) = two_preference_scenario();

        let err = generator.generate(&prefs, &rooms, &slots).unwrap_err();

        assert!(matches!(err, SchedulerError::Commit(_)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn invalid_slot_is_rejected_before_allocation() {
        let (store, generator) = memory_generator();
        let (prefs, rooms, mut slots) = two_preference_scenario();
        slots.push(slot(3, Weekday::Friday, 11, 10));

        let err = generator.generate(&prefs, &rooms, &slots).unwrap_err();

        assert!(matches!(err, SchedulerError::InvalidTimeSlot { slot: 3, .. }));
        assert!(store.load_all().unwrap().is_empty());
    }

    // ── Properties ────────────────────────────────────────────────────────────

    #[test]
    fn rerun_with_same_input_yields_identical_schedule() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let generator = TimetableGenerator::new(store.clone());
        let (prefs, rooms, slots) = two_preference_scenario();

        let first = generator.generate(&prefs, &rooms, &slots).unwrap();
        let after_first = store.load_all().unwrap();
        let second = generator.generate(&prefs, &rooms, &slots).unwrap();
        let after_second = store.load_all().unwrap();

        assert_eq!(first, second);
        assert_eq!(after_first, after_second, "schedule drifted between runs");
        assert_eq!(after_second.len(), 2, "no duplicate rows after re-run");
    }

    #[test]
    fn published_reflects_last_commit() {
        let (_store, generator) = memory_generator();
        let (prefs, rooms, slots) = two_preference_scenario();
        generator.generate(&prefs, &rooms, &slots).unwrap();

        let published = generator.published().unwrap();
        assert!(published.success);
        assert_eq!(published.count, 2);
    }

    #[test]
    fn concurrent_runs_are_serialised() {
        let store = Arc::new(OverlapDetectingStore::default());
        let generator = Arc::new(TimetableGenerator::new(store.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || {
                    let (prefs, rooms, slots) = two_preference_scenario();
                    generator.generate(&prefs, &rooms, &slots).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().success);
        }

        assert!(
            !store.overlapped.load(Ordering::SeqCst),
            "two commits ran at the same time"
        );
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn generate_from_snapshot_uses_snapshot_lists() {
        let (_store, generator) = memory_generator();
        let (preferences, rooms, time_slots) = two_preference_scenario();
        let snapshot = Snapshot {
            preferences,
            rooms,
            time_slots,
            ..Default::default()
        };

        let report = generator.generate_from_snapshot(&snapshot).unwrap();
        assert_eq!(report.timetable.len(), 2);
    }
}
