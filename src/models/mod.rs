//! Exam timetabling domain models.
//!
//! Entities supplied by the caller (exams, students, rooms, invigilators,
//! timeslots, settings) and the records a scheduling run produces
//! (assignments, trace entries, conflicts).
//!
//! # Domain Mappings
//!
//! | exam-schedule | Generic scheduling |
//! |---------------|--------------------|
//! | Exam | Task |
//! | Room | Primary resource with capacity |
//! | Invigilator | Human resource with load limit |
//! | Timeslot | Discrete time bucket |
//! | Timetable | Schedule |

mod constraint;
mod exam;
mod resource;
mod settings;
mod timeslot;
mod timetable;
mod trace;

pub use constraint::{CheckResult, ConstraintKind, ConstraintViolation, ViolationDetails};
pub use exam::{Exam, Student};
pub use resource::{Invigilator, InvigilatorAvailability, Room, RoomAvailability};
pub use settings::{LoadScope, LockConstraints, SchedulerSettings};
pub use timeslot::Timeslot;
pub use timetable::{ScheduleAssignment, Timetable};
pub use trace::{count_actions, CandidateRef, ConflictRecord, TraceAction, TraceEntry, ALL_EXAMS};
