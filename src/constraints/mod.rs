//! Constraint evaluation over a partial timetable.
//!
//! A [`Candidate`] is one (exam, room, timeslot, invigilator) choice. It
//! is tested against the assignments accepted so far by
//! [`validate_assignment`], which runs every check in a fixed order:
//!
//! 1. ROOM_CAPACITY
//! 2. DOUBLE_BOOKING
//! 3. STUDENT_CLASH
//! 4. FORBIDDEN_SLOT (only when forbidden slots are avoided)
//! 5. INVIGILATOR_LOAD (availability and load limit)
//! 6. INVIGILATOR_LOAD (invigilator double booking)
//!
//! Order decides which violation is reported first, not legality.
//!
//! # Preconditions
//! The candidate's room, timeslot and invigilator must be real entities
//! of the run. Unknown IDs inside `assignments` are tolerated and never
//! produce a conflict on their own.

mod checks;

pub use checks::{
    check_double_booking, check_forbidden_slot, check_invigilator_double_booking,
    check_invigilator_load, check_room_capacity, check_student_clash, current_load,
};

use std::collections::HashMap;

use crate::enrollment::Enrollment;
use crate::models::{
    CandidateRef, CheckResult, ConstraintViolation, Exam, Invigilator, LoadScope, Room,
    ScheduleAssignment, SchedulerSettings, Timeslot,
};

/// One (exam, room, timeslot, invigilator) choice with its resolved
/// student count.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub exam: &'a Exam,
    pub room: &'a Room,
    pub timeslot: &'a Timeslot,
    pub invigilator: &'a Invigilator,
    pub student_count: usize,
}

impl<'a> Candidate<'a> {
    pub fn new(
        exam: &'a Exam,
        room: &'a Room,
        timeslot: &'a Timeslot,
        invigilator: &'a Invigilator,
        student_count: usize,
    ) -> Self {
        Self {
            exam,
            room,
            timeslot,
            invigilator,
            student_count,
        }
    }

    /// The ID triple, as recorded in trace entries and conflicts.
    pub fn to_ref(&self) -> CandidateRef {
        CandidateRef::new(&self.room.id, &self.timeslot.id, &self.invigilator.id)
    }
}

/// Lookups and switches shared by all checks of a run.
pub struct ConstraintContext<'a> {
    exam_codes: HashMap<&'a str, &'a str>,
    timeslot_dates: HashMap<&'a str, &'a str>,
    enrollment: &'a dyn Enrollment,
    check_forbidden: bool,
    load_scope: LoadScope,
}

impl<'a> ConstraintContext<'a> {
    /// Creates a context that checks forbidden slots and counts load per day.
    pub fn new(
        exams: &'a [Exam],
        timeslots: &'a [Timeslot],
        enrollment: &'a dyn Enrollment,
    ) -> Self {
        Self {
            exam_codes: exams
                .iter()
                .map(|e| (e.id.as_str(), e.code.as_str()))
                .collect(),
            timeslot_dates: timeslots
                .iter()
                .map(|t| (t.id.as_str(), t.date.as_str()))
                .collect(),
            enrollment,
            check_forbidden: true,
            load_scope: LoadScope::PerDay,
        }
    }

    /// Creates a context configured from run settings.
    pub fn from_settings(
        exams: &'a [Exam],
        timeslots: &'a [Timeslot],
        enrollment: &'a dyn Enrollment,
        settings: &SchedulerSettings,
    ) -> Self {
        Self::new(exams, timeslots, enrollment)
            .with_forbidden_check(settings.avoid_forbidden_timeslots)
            .with_load_scope(settings.load_scope)
    }

    /// Enables or disables the FORBIDDEN_SLOT check.
    pub fn with_forbidden_check(mut self, on: bool) -> Self {
        self.check_forbidden = on;
        self
    }

    /// Sets the invigilator load window.
    pub fn with_load_scope(mut self, scope: LoadScope) -> Self {
        self.load_scope = scope;
        self
    }

    pub fn enrollment(&self) -> &dyn Enrollment {
        self.enrollment
    }

    pub fn load_scope(&self) -> LoadScope {
        self.load_scope
    }

    pub fn checks_forbidden(&self) -> bool {
        self.check_forbidden
    }

    /// Date of a known timeslot.
    pub fn timeslot_date(&self, timeslot_id: &str) -> Option<&str> {
        self.timeslot_dates.get(timeslot_id).copied()
    }

    /// Course code of an exam, falling back to its ID.
    pub fn exam_code<'b>(&'b self, exam_id: &'b str) -> &'b str {
        self.exam_codes.get(exam_id).copied().unwrap_or(exam_id)
    }
}

impl std::fmt::Debug for ConstraintContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintContext")
            .field("exams", &self.exam_codes.len())
            .field("timeslots", &self.timeslot_dates.len())
            .field("check_forbidden", &self.check_forbidden)
            .field("load_scope", &self.load_scope)
            .finish()
    }
}

/// Result of evaluating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentValidation {
    /// True iff `violations` is empty.
    pub is_valid: bool,
    /// Every check that ran, in evaluation order.
    pub checks: Vec<CheckResult>,
    /// One entry per failed check, in evaluation order.
    pub violations: Vec<ConstraintViolation>,
}

impl AssignmentValidation {
    /// The violation reported for a rejected candidate.
    pub fn first_violation(&self) -> Option<&ConstraintViolation> {
        self.violations.first()
    }
}

/// Runs every check for `candidate` against `assignments`.
pub fn validate_assignment(
    candidate: &Candidate<'_>,
    assignments: &[ScheduleAssignment],
    context: &ConstraintContext<'_>,
) -> AssignmentValidation {
    let mut checks = Vec::with_capacity(6);

    checks.push(check_room_capacity(candidate.room, candidate.student_count));
    checks.push(check_double_booking(
        candidate.room,
        candidate.timeslot,
        assignments,
    ));
    checks.push(check_student_clash(
        candidate.exam,
        candidate.timeslot,
        assignments,
        context,
    ));
    if context.checks_forbidden() {
        checks.push(check_forbidden_slot(candidate.timeslot));
    }
    checks.push(check_invigilator_load(
        candidate.invigilator,
        candidate.timeslot,
        assignments,
        context,
    ));
    checks.push(check_invigilator_double_booking(
        candidate.invigilator,
        candidate.timeslot,
        assignments,
    ));

    let violations: Vec<ConstraintViolation> = checks
        .iter()
        .filter_map(|c| ConstraintViolation::from_check(&candidate.exam.id, c))
        .collect();

    AssignmentValidation {
        is_valid: violations.is_empty(),
        checks,
        violations,
    }
}

/// Whether placing `candidate` would make the timetable illegal.
pub fn causes_contradiction(
    candidate: &Candidate<'_>,
    assignments: &[ScheduleAssignment],
    context: &ConstraintContext<'_>,
) -> bool {
    !validate_assignment(candidate, assignments, context).is_valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::EnrollmentIndex;
    use crate::models::{ConstraintKind, ViolationDetails};

    struct Fixture {
        exams: Vec<Exam>,
        rooms: Vec<Room>,
        timeslots: Vec<Timeslot>,
        invigilators: Vec<Invigilator>,
        index: EnrollmentIndex,
    }

    fn fixture() -> Fixture {
        let exams = vec![
            Exam::new("E1", "CS101").with_students(["s1", "s2"]),
            Exam::new("E2", "CS102").with_students(["s2", "s3"]),
        ];
        let index = EnrollmentIndex::from_exams(&exams);
        Fixture {
            exams,
            rooms: vec![Room::new("R1", 10), Room::new("R2", 1)],
            timeslots: vec![
                Timeslot::new("T1", "2024-05-15"),
                Timeslot::new("T2", "2024-05-15").forbidden(),
            ],
            invigilators: vec![Invigilator::new("I1", 1), Invigilator::new("I2", 2)],
            index,
        }
    }

    #[test]
    fn test_valid_candidate_runs_all_checks() {
        let f = fixture();
        let ctx = ConstraintContext::new(&f.exams, &f.timeslots, &f.index);
        let c = Candidate::new(&f.exams[0], &f.rooms[0], &f.timeslots[0], &f.invigilators[0], 2);

        let v = validate_assignment(&c, &[], &ctx);
        assert!(v.is_valid);
        assert!(v.violations.is_empty());
        assert_eq!(v.checks.len(), 6);
        let kinds: Vec<ConstraintKind> = v.checks.iter().map(|c| c.constraint).collect();
        assert_eq!(
            kinds,
            vec![
                ConstraintKind::RoomCapacity,
                ConstraintKind::DoubleBooking,
                ConstraintKind::StudentClash,
                ConstraintKind::ForbiddenSlot,
                ConstraintKind::InvigilatorLoad,
                ConstraintKind::InvigilatorLoad,
            ]
        );
        assert!(!causes_contradiction(&c, &[], &ctx));
    }

    #[test]
    fn test_forbidden_check_skipped_when_disabled() {
        let f = fixture();
        let ctx =
            ConstraintContext::new(&f.exams, &f.timeslots, &f.index).with_forbidden_check(false);
        let c = Candidate::new(&f.exams[0], &f.rooms[0], &f.timeslots[1], &f.invigilators[0], 2);

        let v = validate_assignment(&c, &[], &ctx);
        assert!(v.is_valid);
        assert_eq!(v.checks.len(), 5);
    }

    #[test]
    fn test_violations_in_check_order() {
        let f = fixture();
        let ctx = ConstraintContext::new(&f.exams, &f.timeslots, &f.index);
        let existing = vec![ScheduleAssignment::new("E1", "R2", "T1", "I1")];
        // Too small, double-booked, clashing and load-limited all at once.
        let c = Candidate::new(&f.exams[1], &f.rooms[1], &f.timeslots[0], &f.invigilators[0], 2);

        let v = validate_assignment(&c, &existing, &ctx);
        assert!(!v.is_valid);
        let kinds: Vec<ConstraintKind> = v.violations.iter().map(|v| v.constraint).collect();
        assert_eq!(
            kinds,
            vec![
                ConstraintKind::RoomCapacity,
                ConstraintKind::DoubleBooking,
                ConstraintKind::StudentClash,
                ConstraintKind::InvigilatorLoad,
                ConstraintKind::InvigilatorLoad,
            ]
        );
        assert_eq!(
            v.first_violation().map(|v| &v.details),
            Some(&ViolationDetails::Capacity {
                room_capacity: 1,
                student_count: 2
            })
        );
        assert!(causes_contradiction(&c, &existing, &ctx));
    }

    #[test]
    fn test_candidate_ref() {
        let f = fixture();
        let c = Candidate::new(&f.exams[0], &f.rooms[0], &f.timeslots[0], &f.invigilators[1], 2);
        assert_eq!(c.to_ref(), CandidateRef::new("R1", "T1", "I2"));
    }
}
