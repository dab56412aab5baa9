//! Run-scoped availability tracking for teachers and rooms.
//!
//! An [`AvailabilityTracker`] is created empty at the start of every
//! allocation run and dropped at the end of it.  It is never seeded from the
//! persisted schedule: each run starts from a clean slate.

use std::collections::BTreeMap;

use tracing::trace;

use crate::model::{Interval, RoomId, TeacherId};

use super::conflict::conflicts;

/// The two kinds of entity that can be double-booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Teacher,
    Room,
}

/// Per-entity busy intervals: entity id → intervals claimed this run.
///
/// `BTreeMap` keeps debug output ordered by id.
type BusyMap = BTreeMap<u32, Vec<Interval>>;

#[derive(Debug, Default, Clone)]
pub struct AvailabilityTracker {
    teacher_busy: BusyMap,
    room_busy: BusyMap,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff any interval already recorded for the entity conflicts with
    /// `candidate`.
    pub fn is_busy(&self, kind: EntityKind, id: u32, candidate: &Interval) -> bool {
        self.map(kind)
            .get(&id)
            .is_some_and(|claimed| claimed.iter().any(|iv| conflicts(iv, candidate)))
    }

    /// Record `interval` as claimed by the entity.  No deduplication.
    pub fn mark_busy(&mut self, kind: EntityKind, id: u32, interval: Interval) {
        self.map_mut(kind).entry(id).or_default().push(interval);
    }

    /// `true` if both the teacher and the room are free at `candidate`.
    pub fn is_free(&self, teacher: TeacherId, room: RoomId, candidate: &Interval) -> bool {
        !self.is_busy(EntityKind::Teacher, teacher, candidate)
            && !self.is_busy(EntityKind::Room, room, candidate)
    }

    /// Mark both the teacher and the room busy at `interval`.
    pub fn claim(&mut self, teacher: TeacherId, room: RoomId, interval: Interval) {
        self.mark_busy(EntityKind::Teacher, teacher, interval);
        self.mark_busy(EntityKind::Room, room, interval);
        trace!(
            teacher = teacher,
            room = room,
            day = %interval.day,
            teacher_load = self.load(EntityKind::Teacher, teacher),
            room_load = self.load(EntityKind::Room, room),
            "interval claimed"
        );
    }

    /// Number of intervals recorded for the entity.
    pub(crate) fn load(&self, kind: EntityKind, id: u32) -> usize {
        self.map(kind).get(&id).map_or(0, Vec::len)
    }

    fn map(&self, kind: EntityKind) -> &BusyMap {
        match kind {
            EntityKind::Teacher => &self.teacher_busy,
            EntityKind::Room => &self.room_busy,
        }
    }

    fn map_mut(&mut self, kind: EntityKind) -> &mut BusyMap {
        match kind {
            EntityKind::Teacher => &mut self.teacher_busy,
            EntityKind::Room => &mut self.room_busy,
        }
    }
}
