/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable-O – teaching-session scheduler
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── model       – rooms, slots, teachers, preferences, assignments
//! ├── snapshot/   – YAML input snapshot, reference resolution
//! ├── scheduler/  – conflict predicate, availability tracker, greedy allocator
//! ├── store/      – persisted active timetable (SQLite / in-memory)
//! ├── report      – success / timetable / deadlocks payloads
//! └── generator   – run lock + allocate + commit + report
//! ```

pub mod generator;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod snapshot;
pub mod store;
