/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! SQLite-backed active timetable.
//!
//! Rows are stored denormalised (teacher, subject, slot and room fields are
//! copied into each row) so the table can be read back without the
//! reference data that produced it.  Clock times are stored as `HH:MM:SS`
//! text, days as their full English name.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::model::{clock, Assignment, Room, Subject, Teacher, TimeSlot, Weekday};

use super::{ScheduleStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS active_timetable (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    teacher_id         INTEGER NOT NULL,
    teacher_username   TEXT    NOT NULL,
    teacher_short_form TEXT,
    short_form         TEXT    NOT NULL,
    subject_id         INTEGER NOT NULL,
    subject_code       TEXT    NOT NULL,
    subject_name       TEXT    NOT NULL,
    semester           INTEGER NOT NULL,
    slot_id            INTEGER NOT NULL,
    day_of_week        TEXT    NOT NULL,
    start_time         TEXT    NOT NULL,
    end_time           TEXT    NOT NULL,
    room_id            INTEGER NOT NULL,
    room_number        TEXT    NOT NULL,
    room_capacity      INTEGER
);
";

const INSERT: &str = "
INSERT INTO active_timetable (
    teacher_id, teacher_username, teacher_short_form, short_form,
    subject_id, subject_code, subject_name, semester,
    slot_id, day_of_week, start_time, end_time,
    room_id, room_number, room_capacity
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
";

const SELECT_ALL: &str = "
SELECT id,
       teacher_id, teacher_username, teacher_short_form, short_form,
       subject_id, subject_code, subject_name, semester,
       slot_id, day_of_week, start_time, end_time,
       room_id, room_number, room_capacity
FROM active_timetable
ORDER BY id
";

const STORED_TIME_FORMAT: &str = "%H:%M:%S";

/// Active timetable in a SQLite database.
///
/// The connection sits behind a `Mutex`; `replace_all` holds it for the whole
/// transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!("Opening timetable database: {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    /// Private in-memory database (lost on drop).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ScheduleStore for SqliteStore {
    fn replace_all(&self, assignments: &[Assignment]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        // Dropping `tx` on any early return rolls the whole replace back.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM active_timetable", [])?;
        {
            let mut insert = tx.prepare(INSERT)?;
            for a in assignments {
                insert.execute(params![
                    a.teacher.id,
                    a.teacher.username,
                    a.teacher.short_form,
                    a.short_form,
                    a.subject.id,
                    a.subject.code,
                    a.subject.name,
                    a.semester,
                    a.time_slot.id,
                    a.time_slot.day.as_str(),
                    a.time_slot.start.format(STORED_TIME_FORMAT).to_string(),
                    a.time_slot.end.format(STORED_TIME_FORMAT).to_string(),
                    a.room.id,
                    a.room.number,
                    a.room.capacity,
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            removed = removed,
            inserted = assignments.len(),
            "active timetable replaced"
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Assignment>, StoreError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(SELECT_ALL)?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredRow {
                id: row.get(0)?,
                teacher_id: row.get(1)?,
                teacher_username: row.get(2)?,
                teacher_short_form: row.get(3)?,
                short_form: row.get(4)?,
                subject_id: row.get(5)?,
                subject_code: row.get(6)?,
                subject_name: row.get(7)?,
                semester: row.get(8)?,
                slot_id: row.get(9)?,
                day_of_week: row.get(10)?,
                start_time: row.get(11)?,
                end_time: row.get(12)?,
                room_id: row.get(13)?,
                room_number: row.get(14)?,
                room_capacity: row.get(15)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_assignment()?);
        }
        Ok(out)
    }
}

// ── Row decoding ──────────────────────────────────────────────────────────────

struct StoredRow {
    id: i64,
    teacher_id: u32,
    teacher_username: String,
    teacher_short_form: Option<String>,
    short_form: String,
    subject_id: u32,
    subject_code: String,
    subject_name: String,
    semester: u32,
    slot_id: u32,
    day_of_week: String,
    start_time: String,
    end_time: String,
    room_id: u32,
    room_number: String,
    room_capacity: Option<u32>,
}

impl StoredRow {
    fn into_assignment(self) -> Result<Assignment, StoreError> {
        let row = self.id;
        let corrupt = |detail: String| StoreError::Corrupt { row, detail };

        let day: Weekday = self
            .day_of_week
            .parse()
            .map_err(|e: crate::model::UnknownWeekday| corrupt(e.to_string()))?;
        let start = clock::parse(&self.start_time)
            .map_err(|e| corrupt(format!("start_time '{}': {e}", self.start_time)))?;
        let end = clock::parse(&self.end_time)
            .map_err(|e| corrupt(format!("end_time '{}': {e}", self.end_time)))?;

        Ok(Assignment {
            teacher: Teacher {
                id: self.teacher_id,
                username: self.teacher_username,
                short_form: self.teacher_short_form,
            },
            subject: Subject {
                id: self.subject_id,
                code: self.subject_code,
                name: self.subject_name,
            },
            semester: self.semester,
            time_slot: TimeSlot {
                id: self.slot_id,
                day,
                start,
                end,
            },
            room: Room {
                id: self.room_id,
                number: self.room_number,
                capacity: self.room_capacity,
            },
            short_form: self.short_form,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
