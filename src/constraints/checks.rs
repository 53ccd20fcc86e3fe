//! Individual constraint checks.
//!
//! Each check tests one rule for a candidate against the assignments
//! accepted so far and never fails for well-formed input. IDs in
//! `assignments` that the context does not know are treated as
//! non-conflicting.

use crate::models::{
    CheckResult, ConstraintKind, Exam, Invigilator, LoadScope, Room, ScheduleAssignment,
    Timeslot, ViolationDetails,
};

use super::ConstraintContext;

/// ROOM_CAPACITY: the room seats every student.
pub fn check_room_capacity(room: &Room, student_count: usize) -> CheckResult {
    if room.fits(student_count) {
        CheckResult::pass(
            ConstraintKind::RoomCapacity,
            format!(
                "Room {} (capacity: {}) can accommodate {} students",
                room.label(),
                room.capacity,
                student_count
            ),
        )
    } else {
        CheckResult::fail(
            ConstraintKind::RoomCapacity,
            format!(
                "VIOLATION: Room {} has capacity {}, but exam has {} students",
                room.label(),
                room.capacity,
                student_count
            ),
            ViolationDetails::Capacity {
                room_capacity: room.capacity,
                student_count,
            },
        )
    }
}

/// DOUBLE_BOOKING: the room is free at the timeslot.
pub fn check_double_booking(
    room: &Room,
    timeslot: &Timeslot,
    assignments: &[ScheduleAssignment],
) -> CheckResult {
    let conflict = assignments
        .iter()
        .find(|a| a.room_id == room.id && a.timeslot_id == timeslot.id);

    match conflict {
        None => CheckResult::pass(
            ConstraintKind::DoubleBooking,
            format!(
                "Room {} is available at {} on {}",
                room.label(),
                timeslot.display_label(),
                timeslot.date
            ),
        ),
        Some(existing) => CheckResult::fail(
            ConstraintKind::DoubleBooking,
            format!(
                "VIOLATION: Room {} is already booked for exam {} at this time",
                room.label(),
                existing.exam_id
            ),
            ViolationDetails::RoomBooking {
                room_id: room.id.clone(),
                timeslot_id: timeslot.id.clone(),
                conflicting_exam_id: existing.exam_id.clone(),
            },
        ),
    }
}

/// STUDENT_CLASH: no exam already in the timeslot shares a student.
pub fn check_student_clash(
    exam: &Exam,
    timeslot: &Timeslot,
    assignments: &[ScheduleAssignment],
    context: &ConstraintContext<'_>,
) -> CheckResult {
    for other in assignments.iter().filter(|a| a.timeslot_id == timeslot.id) {
        if other.exam_id == exam.id {
            continue;
        }
        let shared = context
            .enrollment()
            .shared_students(&exam.id, &other.exam_id);
        if let Some(first) = shared.first() {
            return CheckResult::fail(
                ConstraintKind::StudentClash,
                format!(
                    "VIOLATION: {} student(s) enrolled in both {} and {} (e.g., {})",
                    shared.len(),
                    exam.code,
                    context.exam_code(&other.exam_id),
                    first
                ),
                ViolationDetails::StudentClash {
                    timeslot_id: timeslot.id.clone(),
                    other_exam_id: other.exam_id.clone(),
                    shared_students: shared.len(),
                },
            );
        }
    }

    CheckResult::pass(
        ConstraintKind::StudentClash,
        format!(
            "No student conflicts detected for {} at {} on {}",
            exam.code,
            timeslot.display_label(),
            timeslot.date
        ),
    )
}

/// FORBIDDEN_SLOT: the timeslot is not marked forbidden.
pub fn check_forbidden_slot(timeslot: &Timeslot) -> CheckResult {
    if timeslot.is_forbidden {
        CheckResult::fail(
            ConstraintKind::ForbiddenSlot,
            format!(
                "VIOLATION: Timeslot {} on {} is marked as forbidden",
                timeslot.display_label(),
                timeslot.date
            ),
            ViolationDetails::ForbiddenSlot {
                timeslot_id: timeslot.id.clone(),
            },
        )
    } else {
        CheckResult::pass(
            ConstraintKind::ForbiddenSlot,
            format!(
                "Timeslot {} on {} is available",
                timeslot.display_label(),
                timeslot.date
            ),
        )
    }
}

/// Assignments the invigilator already holds within the load window of
/// `timeslot`, including the pre-existing `daily_load`.
pub fn current_load(
    invigilator: &Invigilator,
    timeslot: &Timeslot,
    assignments: &[ScheduleAssignment],
    context: &ConstraintContext<'_>,
) -> u32 {
    let count = assignments
        .iter()
        .filter(|a| a.invigilator_id == invigilator.id)
        .filter(|a| match context.load_scope() {
            LoadScope::PerRun => true,
            LoadScope::PerDay => {
                context.timeslot_date(&a.timeslot_id) == Some(timeslot.date.as_str())
            }
        })
        .count();
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_add(invigilator.daily_load)
}

/// INVIGILATOR_LOAD: the invigilator is assignable and below `max_load`.
pub fn check_invigilator_load(
    invigilator: &Invigilator,
    timeslot: &Timeslot,
    assignments: &[ScheduleAssignment],
    context: &ConstraintContext<'_>,
) -> CheckResult {
    let load = current_load(invigilator, timeslot, assignments, context);
    let details = ViolationDetails::InvigilatorLoad {
        invigilator_id: invigilator.id.clone(),
        current_load: load,
        max_load: invigilator.max_load,
    };

    if !invigilator.is_assignable() {
        return CheckResult::fail(
            ConstraintKind::InvigilatorLoad,
            format!("VIOLATION: {} is marked as unavailable", invigilator.label()),
            details,
        );
    }

    if load < invigilator.max_load {
        CheckResult::pass(
            ConstraintKind::InvigilatorLoad,
            format!(
                "{} has {}/{} assignments (can take more)",
                invigilator.label(),
                load,
                invigilator.max_load
            ),
        )
    } else {
        CheckResult::fail(
            ConstraintKind::InvigilatorLoad,
            format!(
                "VIOLATION: {} has reached max load of {} assignments",
                invigilator.label(),
                invigilator.max_load
            ),
            details,
        )
    }
}

/// Invigilator double booking, reported as INVIGILATOR_LOAD.
pub fn check_invigilator_double_booking(
    invigilator: &Invigilator,
    timeslot: &Timeslot,
    assignments: &[ScheduleAssignment],
) -> CheckResult {
    let busy = assignments
        .iter()
        .any(|a| a.invigilator_id == invigilator.id && a.timeslot_id == timeslot.id);

    if busy {
        CheckResult::fail(
            ConstraintKind::InvigilatorLoad,
            format!(
                "VIOLATION: {} is already assigned to another exam at this time",
                invigilator.label()
            ),
            ViolationDetails::InvigilatorBooking {
                invigilator_id: invigilator.id.clone(),
                timeslot_id: timeslot.id.clone(),
            },
        )
    } else {
        CheckResult::pass(
            ConstraintKind::InvigilatorLoad,
            format!(
                "{} is available at {} on {}",
                invigilator.label(),
                timeslot.display_label(),
                timeslot.date
            ),
        )
    }
}
