/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core data structures for the Timetable-O scheduler.
//!
//! Two distinct types model the two sides of the scheduling pipeline:
//!
//! ```text
//! snapshot  ──(resolve)──►  Preference  ──(allocator)──►  Assignment  ──(store)──►  active timetable
//!                            ↑ input                         ↑ output
//!                            read-only request               persisted schedule entry
//! ```
//!
//! Reference data ([`Teacher`], [`Subject`], [`Room`], [`TimeSlot`]) is
//! immutable for the duration of a run.  Preferences carry owned copies of the
//! records they reference so the allocator never needs a lookup table.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TeacherId = u32;
pub type SubjectId = u32;
pub type RoomId = u32;
pub type TimeSlotId = u32;

// ── Weekday ───────────────────────────────────────────────────────────────────

/// Teaching day.  Sunday is not a schedulable day.
///
/// Serialised as the full English name.  Deserialisation goes through
/// [`FromStr`], so full names and three-letter abbreviations are accepted in
/// any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a day name is neither a full name nor an abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day of week '{0}' (expected Monday..Saturday)")]
pub struct UnknownWeekday(pub String);

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| {
                let name = d.as_str().to_ascii_lowercase();
                lower == name || lower == name[..3]
            })
            .ok_or_else(|| UnknownWeekday(s.to_string()))
    }
}

impl TryFrom<String> for Weekday {
    type Error = UnknownWeekday;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ── Clock (de)serialisation ───────────────────────────────────────────────────

/// Serde adapter for clock times: writes `HH:MM`, reads `HH:MM` or `HH:MM:SS`.
pub mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const DISPLAY_FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, DISPLAY_FORMAT))
    }

    pub fn format(t: &NaiveTime) -> String {
        t.format(DISPLAY_FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(raw.trim()).map_err(serde::de::Error::custom)
    }
}

// ── Interval ──────────────────────────────────────────────────────────────────

/// Day-tagged, half-open clock interval `[start, end)`.
///
/// This is the unit the availability tracker records and the conflict
/// predicate compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

// ── Reference data ────────────────────────────────────────────────────────────

/// A schedulable `(day, start, end)` unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub day: Weekday,
    #[serde(with = "clock")]
    pub start: NaiveTime,
    #[serde(with = "clock")]
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn interval(&self) -> Interval {
        Interval {
            day: self.day,
            start: self.start,
            end: self.end,
        }
    }

    /// `true` if `other` runs at the same clock time on a different day.
    pub fn is_same_time_other_day(&self, other: &TimeSlot) -> bool {
        self.start == other.start && self.end == other.end && self.day != other.day
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}–{}",
            self.day,
            clock::format(&self.start),
            clock::format(&self.end)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub number: String,
    /// Informational only; capacity is not a scheduling constraint.
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub username: String,
    #[serde(default)]
    pub short_form: Option<String>,
}

impl Teacher {
    /// Short form shown on the timetable, falling back to the username.
    pub fn display_short_form(&self) -> &str {
        self.short_form
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.username)
    }
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.name)
    }
}

// ── Preference (input) ────────────────────────────────────────────────────────

/// One requested teaching session at a preferred time.
///
/// Lower `preference_number` is more preferred.  The allocator reads
/// preferences and never mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub teacher: Teacher,
    pub subject: Subject,
    pub semester: u32,
    pub time_slot: TimeSlot,
    pub preference_number: i32,
}

// ── Assignment (output) ───────────────────────────────────────────────────────

/// A placed teaching session, one row of the persisted timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub teacher: Teacher,
    pub subject: Subject,
    pub semester: u32,
    pub time_slot: TimeSlot,
    pub room: Room,
    pub short_form: String,
}

impl Assignment {
    /// Place `pref` into `room` at `slot` (which may differ from the
    /// preferred slot when the allocator fell back to another day).
    pub fn from_preference(pref: &Preference, slot: &TimeSlot, room: &Room) -> Self {
        Assignment {
            teacher: pref.teacher.clone(),
            subject: pref.subject.clone(),
            semester: pref.semester,
            time_slot: slot.clone(),
            room: room.clone(),
            short_form: pref.teacher.display_short_form().to_string(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}) in {}",
            self.short_form, self.subject.code, self.time_slot, self.room.number
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(id: TimeSlotId, day: Weekday, start: NaiveTime, end: NaiveTime) -> TimeSlot {
        TimeSlot { id, day, start, end }
    }

    // ── Weekday ───────────────────────────────────────────────────────────────

    #[test]
    fn weekday_parses_full_names_and_abbreviations() {
        assert_eq!("Monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("tue".parse::<Weekday>().unwrap(), Weekday::Tuesday);
        assert_eq!(" SATURDAY ".parse::<Weekday>().unwrap(), Weekday::Saturday);
    }

    #[test]
    fn sunday_is_not_a_teaching_day() {
        assert!("Sunday".parse::<Weekday>().is_err());
        assert!("Sun".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekday_serialises_as_full_name() {
        let yaml = serde_yaml::to_string(&Weekday::Wednesday).unwrap();
        assert_eq!(yaml.trim(), "Wednesday");
        let back: Weekday = serde_yaml::from_str("Thu").unwrap();
        assert_eq!(back, Weekday::Thursday);
    }

    #[test]
    fn weekday_deserialises_in_any_case() {
        let lower: Weekday = serde_yaml::from_str("monday").unwrap();
        assert_eq!(lower, Weekday::Monday);
        let upper: Weekday = serde_yaml::from_str("TUE").unwrap();
        assert_eq!(upper, Weekday::Tuesday);
        assert!(serde_yaml::from_str::<Weekday>("Sun").is_err());
    }

    // ── Clock ─────────────────────────────────────────────────────────────────

    #[test]
    fn clock_accepts_with_and_without_seconds() {
        assert_eq!(clock::parse("09:00").unwrap(), t(9, 0));
        assert_eq!(clock::parse("13:45:00").unwrap(), t(13, 45));
        assert!(clock::parse("9am").is_err());
    }

    #[test]
    fn clock_formats_hours_and_minutes_only() {
        assert_eq!(clock::format(&t(8, 5)), "08:05");
    }

    // ── TimeSlot ──────────────────────────────────────────────────────────────

    #[test]
    fn time_slot_display_matches_timetable_label() {
        let s = slot(1, Weekday::Monday, t(9, 0), t(10, 0));
        assert_eq!(s.to_string(), "Monday 09:00–10:00");
    }

    #[test]
    fn same_time_other_day_requires_exact_clock_match() {
        let mon = slot(1, Weekday::Monday, t(9, 0), t(10, 0));
        let tue = slot(2, Weekday::Tuesday, t(9, 0), t(10, 0));
        let tue_long = slot(3, Weekday::Tuesday, t(9, 0), t(11, 0));
        let mon_again = slot(4, Weekday::Monday, t(9, 0), t(10, 0));

        assert!(mon.is_same_time_other_day(&tue));
        assert!(!mon.is_same_time_other_day(&tue_long));
        assert!(!mon.is_same_time_other_day(&mon_again));
    }

    // ── Teacher ───────────────────────────────────────────────────────────────

    #[test]
    fn short_form_falls_back_to_username() {
        let mut teacher = Teacher {
            id: 1,
            username: "alice".into(),
            short_form: None,
        };
        assert_eq!(teacher.display_short_form(), "alice");

        teacher.short_form = Some(String::new());
        assert_eq!(teacher.display_short_form(), "alice");

        teacher.short_form = Some("AL".into());
        assert_eq!(teacher.display_short_form(), "AL");
    }

    // ── Assignment ────────────────────────────────────────────────────────────

    #[test]
    fn assignment_uses_placed_slot_not_preferred_slot() {
        let preferred = slot(1, Weekday::Monday, t(9, 0), t(10, 0));
        let placed = slot(2, Weekday::Tuesday, t(9, 0), t(10, 0));
        let pref = Preference {
            teacher: Teacher {
                id: 7,
                username: "bob".into(),
                short_form: Some("BB".into()),
            },
            subject: Subject {
                id: 3,
                code: "CS101".into(),
                name: "Programming".into(),
            },
            semester: 2,
            time_slot: preferred,
            preference_number: 1,
        };
        let room = Room {
            id: 1,
            number: "R1".into(),
            capacity: None,
        };

        let a = Assignment::from_preference(&pref, &placed, &room);
        assert_eq!(a.time_slot, placed);
        assert_eq!(a.short_form, "BB");
        assert_eq!(a.semester, 2);
        assert_eq!(a.to_string(), "BB - CS101 (Tuesday 09:00–10:00) in R1");
    }

    #[test]
    fn subject_display_joins_code_and_name() {
        let s = Subject {
            id: 1,
            code: "MA201".into(),
            name: "Linear Algebra".into(),
        };
        assert_eq!(s.to_string(), "MA201 - Linear Algebra");
    }
}
