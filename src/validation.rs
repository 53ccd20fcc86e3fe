//! Input integrity checks and independent timetable audits.
//!
//! [`validate_input`] checks the structural integrity of the entity
//! collections before scheduling. Detects:
//! - Duplicate IDs
//! - Rooms with zero capacity
//! - Invigilators with zero load limit
//! - Exams with zero duration
//! - Students listed twice in one exam
//! - Student registrations that point to unknown exams
//!
//! [`validate_schedule`] recounts the hard-constraint conflicts of any
//! assignment list from scratch. It shares no state with the search, so
//! it can audit externally edited timetables as well as search output.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enrollment::{resolve_student_count, Enrollment};
use crate::models::{Exam, Invigilator, Room, ScheduleAssignment, Student, Timeslot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities of one kind share the same ID.
    DuplicateId,
    /// A room seats nobody.
    NonPositiveCapacity,
    /// An invigilator may take no assignments.
    NonPositiveMaxLoad,
    /// An exam lasts zero minutes.
    NonPositiveDuration,
    /// A student appears twice in one exam's enrollment list.
    DuplicateEnrollment,
    /// A registration references an exam that doesn't exist.
    UnknownReference,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::DuplicateId => "duplicate id",
            Self::NonPositiveCapacity => "non-positive capacity",
            Self::NonPositiveMaxLoad => "non-positive max load",
            Self::NonPositiveDuration => "non-positive duration",
            Self::DuplicateEnrollment => "duplicate enrollment",
            Self::UnknownReference => "unknown reference",
        };
        f.write_str(s)
    }
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn check_unique<'a>(
    label: &str,
    ids: impl IntoIterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {label} ID: {id}"),
            ));
        }
    }
}

/// Validates the entity collections of a scheduling run.
///
/// Checks:
/// 1. No duplicate exam, room, timeslot or invigilator IDs
/// 2. Every room has capacity > 0
/// 3. Every invigilator has max load > 0
/// 4. Every exam has duration > 0
/// 5. No exam lists the same student twice
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    exams: &[Exam],
    rooms: &[Room],
    timeslots: &[Timeslot],
    invigilators: &[Invigilator],
) -> ValidationResult {
    let mut errors = Vec::new();

    check_unique("exam", exams.iter().map(|e| e.id.as_str()), &mut errors);
    check_unique("room", rooms.iter().map(|r| r.id.as_str()), &mut errors);
    check_unique(
        "timeslot",
        timeslots.iter().map(|t| t.id.as_str()),
        &mut errors,
    );
    check_unique(
        "invigilator",
        invigilators.iter().map(|i| i.id.as_str()),
        &mut errors,
    );

    for room in rooms.iter().filter(|r| r.capacity == 0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveCapacity,
            format!("Room '{}' has zero capacity", room.id),
        ));
    }

    for inv in invigilators.iter().filter(|i| i.max_load == 0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveMaxLoad,
            format!("Invigilator '{}' has a max load of zero", inv.id),
        ));
    }

    for exam in exams {
        if exam.duration_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!("Exam '{}' has zero duration", exam.id),
            ));
        }

        let mut students = HashSet::new();
        for student in &exam.enrolled_students {
            if !students.insert(student.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateEnrollment,
                    format!("Exam '{}' lists student '{}' twice", exam.id, student),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates student records against the exam list.
///
/// Checks for duplicate student IDs and registrations that reference
/// unknown exams.
pub fn validate_students(students: &[Student], exams: &[Exam]) -> ValidationResult {
    let mut errors = Vec::new();

    check_unique(
        "student",
        students.iter().map(|s| s.id.as_str()),
        &mut errors,
    );

    let exam_ids: HashSet<&str> = exams.iter().map(|e| e.id.as_str()).collect();
    for student in students {
        for exam_id in &student.registered_exams {
            if !exam_ids.contains(exam_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!(
                        "Student '{}' is registered for unknown exam '{}'",
                        student.id, exam_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Decides which audit counts make a timetable invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditPolicy {
    /// Count forbidden-slot use against validity. Off by default:
    /// forbidden slots are reported but advisory.
    pub forbidden_slots_invalidate: bool,
}

impl AuditPolicy {
    /// Policy under which every counted conflict invalidates.
    pub fn strict() -> Self {
        Self {
            forbidden_slots_invalidate: true,
        }
    }
}

/// Conflict counts of a timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAudit {
    /// Pairs of exams in one timeslot that share a student.
    pub student_clashes: usize,
    /// Extra bookings of a (room, timeslot): k bookings count k − 1.
    pub room_conflicts: usize,
    /// Assignments whose room seats fewer than the exam's students.
    pub capacity_violations: usize,
    /// Assignments placed in a forbidden timeslot.
    pub forbidden_slot_violations: usize,
    pub is_valid: bool,
}

impl ScheduleAudit {
    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.student_clashes
            + self.room_conflicts
            + self.capacity_violations
            + self.forbidden_slot_violations
    }
}

/// Audits `assignments` with the default [`AuditPolicy`].
pub fn validate_schedule(
    assignments: &[ScheduleAssignment],
    exams: &[Exam],
    rooms: &[Room],
    timeslots: &[Timeslot],
    enrollment: &dyn Enrollment,
) -> ScheduleAudit {
    validate_schedule_with(
        assignments,
        exams,
        rooms,
        timeslots,
        enrollment,
        &AuditPolicy::default(),
    )
}

/// Audits `assignments` under an explicit policy.
///
/// Assignments naming unknown rooms or timeslots are skipped by the
/// checks that need them. An unknown exam falls back to the assignment's
/// recorded enrolled count for the capacity check.
pub fn validate_schedule_with(
    assignments: &[ScheduleAssignment],
    exams: &[Exam],
    rooms: &[Room],
    timeslots: &[Timeslot],
    enrollment: &dyn Enrollment,
    policy: &AuditPolicy,
) -> ScheduleAudit {
    let exams_by_id: HashMap<&str, &Exam> = exams.iter().map(|e| (e.id.as_str(), e)).collect();
    let rooms_by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    let slots_by_id: HashMap<&str, &Timeslot> =
        timeslots.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut by_timeslot: HashMap<&str, Vec<&ScheduleAssignment>> = HashMap::new();
    let mut room_bookings: HashMap<(&str, &str), usize> = HashMap::new();
    let mut capacity_violations = 0;
    let mut forbidden_slot_violations = 0;

    for a in assignments {
        by_timeslot.entry(a.timeslot_id.as_str()).or_default().push(a);
        *room_bookings
            .entry((a.room_id.as_str(), a.timeslot_id.as_str()))
            .or_insert(0) += 1;

        if let Some(room) = rooms_by_id.get(a.room_id.as_str()) {
            let students = match exams_by_id.get(a.exam_id.as_str()) {
                Some(exam) => resolve_student_count(enrollment, exam),
                None => a.enrolled_count,
            };
            if !room.fits(students) {
                capacity_violations += 1;
            }
        }

        if slots_by_id
            .get(a.timeslot_id.as_str())
            .is_some_and(|t| t.is_forbidden)
        {
            forbidden_slot_violations += 1;
        }
    }

    let room_conflicts = room_bookings.values().map(|k| k - 1).sum();

    let mut student_clashes = 0;
    for group in by_timeslot.values() {
        for (i, first) in group.iter().enumerate() {
            for second in &group[i + 1..] {
                if first.exam_id != second.exam_id
                    && enrollment.shares_students(&first.exam_id, &second.exam_id)
                {
                    student_clashes += 1;
                }
            }
        }
    }

    let is_valid = student_clashes == 0
        && room_conflicts == 0
        && capacity_violations == 0
        && (!policy.forbidden_slots_invalidate || forbidden_slot_violations == 0);

    ScheduleAudit {
        student_clashes,
        room_conflicts,
        capacity_violations,
        forbidden_slot_violations,
        is_valid,
    }
}
