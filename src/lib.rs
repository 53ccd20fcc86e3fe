//! Explainable exam timetabling.
//!
//! Places every exam into a (room, timeslot, invigilator) triple by
//! backtracking search under hard constraints, and records every trial
//! in an append-only trace so each decision can be explained afterwards.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Exam`, `Student`, `Room`, `Invigilator`,
//!   `Timeslot`, `ScheduleAssignment`, `Timetable`, `TraceEntry`,
//!   `ConflictRecord`, `SchedulerSettings`, `LockConstraints`
//! - **`enrollment`**: Student-count and shared-student lookups
//! - **`constraints`**: Hard-constraint checks for one candidate
//! - **`heuristics`**: Candidate generation, LCV scoring, MCV exam ordering
//! - **`search`**: Backtracking search with audit trace
//! - **`scheduler`**: `SchedulingAgent`, lock constraints, metrics, roster
//! - **`validation`**: Input integrity checks and independent timetable audits
//!
//! # Hard constraints
//!
//! | Kind | Rule |
//! |------|------|
//! | ROOM_CAPACITY | Room seats every student of the exam |
//! | DOUBLE_BOOKING | One exam per room per timeslot |
//! | STUDENT_CLASH | No student sits two exams in one timeslot |
//! | FORBIDDEN_SLOT | Forbidden timeslots stay empty (when enabled) |
//! | INVIGILATOR_LOAD | Invigilator available, under load limit, one exam per timeslot |
//!
//! # References
//!
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6
//! - Carter, Laporte & Lee (1996), "Examination timetabling: Algorithmic
//!   strategies and applications"

pub mod constraints;
pub mod enrollment;
pub mod heuristics;
pub mod models;
pub mod scheduler;
pub mod search;
pub mod validation;
