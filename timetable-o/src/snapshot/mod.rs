//! Input snapshot loading and validation.
//!
//! A snapshot is the complete reference data for one run: teachers,
//! subjects, rooms, time slots and the teachers' ranked preferences.
//! Preferences refer to the other sections by id; loading resolves those ids
//! into fully-populated [`Preference`] values so the scheduler never needs a
//! lookup table.
//!
//! The expected YAML structure is:
//! ```yaml
//! teachers:
//!   - { id: 1, username: alice, short_form: AL }
//! subjects:
//!   - { id: 1, code: CS101, name: "Programming I" }
//! rooms:
//!   - { id: 1, number: "R101", capacity: 40 }
//! time_slots:
//!   - { id: 1, day: Monday, start: "09:00", end: "10:00" }
//! preferences:
//!   - { teacher: 1, subject: 1, semester: 1, time_slot: 1, preference_number: 1 }
//! ```
//!
//! List order is significant: rooms and time slots are searched in the order
//! they appear, and preferences with equal `preference_number` are processed
//! in the order they appear.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{
    Preference, Room, RoomId, Subject, SubjectId, Teacher, TeacherId, TimeSlot, TimeSlotId,
    Weekday,
};

// ── Private YAML deserialisation types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    teachers: Vec<Teacher>,
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    time_slots: Vec<TimeSlot>,
    #[serde(default)]
    preferences: Vec<PreferenceEntry>,
}

/// A preference as it appears in the YAML file, referencing entities by id.
#[derive(Debug, Deserialize)]
struct PreferenceEntry {
    teacher: TeacherId,
    subject: SubjectId,
    semester: u32,
    time_slot: TimeSlotId,
    preference_number: i32,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Reference data that violates a model invariant.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("time slot {slot}: start {start} is not before end {end}")]
    InvalidTimeRange {
        slot: TimeSlotId,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("time slots {first} and {second} are both {day} {start}–{end}")]
    DuplicateTimeSlot {
        first: TimeSlotId,
        second: TimeSlotId,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("room number '{number}' is used by rooms {first} and {second}")]
    DuplicateRoomNumber {
        number: String,
        first: RoomId,
        second: RoomId,
    },

    #[error("duplicate {section} id {id}")]
    DuplicateId { section: &'static str, id: u32 },

    #[error("preference #{index} refers to unknown {section} {id}")]
    UnknownReference {
        index: usize,
        section: &'static str,
        id: u32,
    },

    #[error("teacher {teacher} has more than one preference for subject {subject} in slot {slot}")]
    DuplicatePreference {
        teacher: TeacherId,
        subject: SubjectId,
        slot: TimeSlotId,
    },
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Validated, fully-resolved input for one scheduling run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub rooms: Vec<Room>,
    pub time_slots: Vec<TimeSlot>,
    pub preferences: Vec<Preference>,
}

/// One teacher's preferences, as shown in the grouped admin view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherPreferences {
    pub teacher: String,
    pub preferences: Vec<PreferenceView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceView {
    /// `"CODE - Name"`.
    pub subject: String,
    pub semester: u32,
    /// `"Monday 09:00–10:00"`.
    pub time_slot: String,
    pub preference_number: i32,
}

impl Snapshot {
    /// Parses `path` and resolves it into a [`Snapshot`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is structurally
    /// invalid, or the data breaks a [`SnapshotError`] rule.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading snapshot from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open snapshot file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Invalid snapshot file: {}", path.display()))
    }

    /// Parses a YAML document and resolves it into a [`Snapshot`].
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: SnapshotFile =
            serde_yaml::from_str(content).context("Failed to parse snapshot YAML")?;
        let snapshot = Self::resolve(file)?;

        info!(
            teachers = snapshot.teachers.len(),
            subjects = snapshot.subjects.len(),
            rooms = snapshot.rooms.len(),
            time_slots = snapshot.time_slots.len(),
            preferences = snapshot.preferences.len(),
            "Snapshot loaded"
        );
        if snapshot.rooms.is_empty() {
            warn!("Snapshot has no rooms, every run will report insufficient input");
        }
        Ok(snapshot)
    }

    fn resolve(file: SnapshotFile) -> Result<Self, SnapshotError> {
        check_unique_ids("teacher", file.teachers.iter().map(|t| t.id))?;
        check_unique_ids("subject", file.subjects.iter().map(|s| s.id))?;
        check_unique_ids("room", file.rooms.iter().map(|r| r.id))?;
        check_unique_ids("time slot", file.time_slots.iter().map(|s| s.id))?;
        validate_time_slots(&file.time_slots)?;
        validate_rooms(&file.rooms)?;

        let teachers: HashMap<TeacherId, &Teacher> =
            file.teachers.iter().map(|t| (t.id, t)).collect();
        let subjects: HashMap<SubjectId, &Subject> =
            file.subjects.iter().map(|s| (s.id, s)).collect();
        let slots: HashMap<TimeSlotId, &TimeSlot> =
            file.time_slots.iter().map(|s| (s.id, s)).collect();

        let mut seen = HashSet::new();
        let mut preferences = Vec::with_capacity(file.preferences.len());
        for (index, entry) in file.preferences.iter().enumerate() {
            let unknown = |section, id| SnapshotError::UnknownReference { index, section, id };

            let teacher = teachers
                .get(&entry.teacher)
                .ok_or_else(|| unknown("teacher", entry.teacher))?;
            let subject = subjects
                .get(&entry.subject)
                .ok_or_else(|| unknown("subject", entry.subject))?;
            let slot = slots
                .get(&entry.time_slot)
                .ok_or_else(|| unknown("time slot", entry.time_slot))?;

            if !seen.insert((entry.teacher, entry.subject, entry.time_slot)) {
                return Err(SnapshotError::DuplicatePreference {
                    teacher: entry.teacher,
                    subject: entry.subject,
                    slot: entry.time_slot,
                });
            }

            debug!(
                "  Preference: {} | {} | {} | rank {}",
                teacher, subject.code, slot, entry.preference_number
            );

            preferences.push(Preference {
                teacher: (*teacher).clone(),
                subject: (*subject).clone(),
                semester: entry.semester,
                time_slot: (*slot).clone(),
                preference_number: entry.preference_number,
            });
        }

        Ok(Snapshot {
            teachers: file.teachers,
            subjects: file.subjects,
            rooms: file.rooms,
            time_slots: file.time_slots,
            preferences,
        })
    }

    /// Preferences grouped by teacher username, teachers in order of first
    /// appearance, each teacher's entries in input order.
    pub fn preferences_by_teacher(&self) -> Vec<TeacherPreferences> {
        let mut groups: Vec<TeacherPreferences> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for pref in &self.preferences {
            let at = *index.entry(pref.teacher.username.as_str()).or_insert_with(|| {
                groups.push(TeacherPreferences {
                    teacher: pref.teacher.username.clone(),
                    preferences: Vec::new(),
                });
                groups.len() - 1
            });
            groups[at].preferences.push(PreferenceView {
                subject: pref.subject.to_string(),
                semester: pref.semester,
                time_slot: pref.time_slot.to_string(),
                preference_number: pref.preference_number,
            });
        }
        groups
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

fn check_unique_ids(
    section: &'static str,
    ids: impl Iterator<Item = u32>,
) -> Result<(), SnapshotError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateId { section, id });
        }
    }
    Ok(())
}

fn validate_time_slots(slots: &[TimeSlot]) -> Result<(), SnapshotError> {
    let mut seen: HashMap<(Weekday, NaiveTime, NaiveTime), TimeSlotId> = HashMap::new();
    for slot in slots {
        if slot.start >= slot.end {
            return Err(SnapshotError::InvalidTimeRange {
                slot: slot.id,
                start: slot.start,
                end: slot.end,
            });
        }
        if let Some(&first) = seen.get(&(slot.day, slot.start, slot.end)) {
            return Err(SnapshotError::DuplicateTimeSlot {
                first,
                second: slot.id,
                day: slot.day,
                start: slot.start,
                end: slot.end,
            });
        }
        seen.insert((slot.day, slot.start, slot.end), slot.id);
    }
    Ok(())
}

fn validate_rooms(rooms: &[Room]) -> Result<(), SnapshotError> {
    let mut seen: HashMap<&str, RoomId> = HashMap::new();
    for room in rooms {
        if let Some(&first) = seen.get(room.number.as_str()) {
            return Err(SnapshotError::DuplicateRoomNumber {
                number: room.number.clone(),
                first,
                second: room.id,
            });
        }
        seen.insert(room.number.as_str(), room.id);
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
