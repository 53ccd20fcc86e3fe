//! Constraint kinds and check records.
//!
//! Every hard rule a timetable must satisfy is named by a
//! [`ConstraintKind`]. Evaluating one rule against a candidate produces a
//! [`CheckResult`]; a failed check is lifted into a
//! [`ConstraintViolation`] with structured [`ViolationDetails`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A hard timetabling constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    /// Enrolled students must fit in the room.
    RoomCapacity,
    /// A room hosts at most one exam per timeslot.
    DoubleBooking,
    /// No student sits two exams in the same timeslot.
    StudentClash,
    /// Forbidden timeslots are not used.
    ForbiddenSlot,
    /// Invigilators stay within their load limit and are never in two
    /// places at once.
    InvigilatorLoad,
}

impl ConstraintKind {
    /// All kinds, in evaluation order.
    pub const ALL: [ConstraintKind; 5] = [
        ConstraintKind::RoomCapacity,
        ConstraintKind::DoubleBooking,
        ConstraintKind::StudentClash,
        ConstraintKind::ForbiddenSlot,
        ConstraintKind::InvigilatorLoad,
    ];

    /// Wire code (e.g., `ROOM_CAPACITY`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomCapacity => "ROOM_CAPACITY",
            Self::DoubleBooking => "DOUBLE_BOOKING",
            Self::StudentClash => "STUDENT_CLASH",
            Self::ForbiddenSlot => "FORBIDDEN_SLOT",
            Self::InvigilatorLoad => "INVIGILATOR_LOAD",
        }
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomCapacity => "Room Capacity",
            Self::DoubleBooking => "Room Double Booking",
            Self::StudentClash => "Student Clash",
            Self::ForbiddenSlot => "Forbidden Timeslot",
            Self::InvigilatorLoad => "Invigilator Load Limit",
        }
    }

    /// One-line rule statement.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RoomCapacity => "The number of enrolled students must not exceed room capacity",
            Self::DoubleBooking => "A room cannot host two exams at the same timeslot",
            Self::StudentClash => "A student cannot have two exams scheduled at the same time",
            Self::ForbiddenSlot => "Exams cannot be scheduled during forbidden time periods",
            Self::InvigilatorLoad => {
                "An invigilator cannot exceed their maximum daily assignments"
            }
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of one constraint check.
///
/// Recorded verbatim in ACCEPT/REJECT trace entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the rule holds.
    pub ok: bool,
    /// Rule that was checked.
    pub constraint: ConstraintKind,
    /// Human-readable explanation.
    pub detail: String,
    /// Structured data for a failed check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ViolationDetails>,
}

impl CheckResult {
    /// A passing check.
    pub fn pass(constraint: ConstraintKind, detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            constraint,
            detail: detail.into(),
            details: None,
        }
    }

    /// A failing check with structured details.
    pub fn fail(
        constraint: ConstraintKind,
        detail: impl Into<String>,
        details: ViolationDetails,
    ) -> Self {
        Self {
            ok: false,
            constraint,
            detail: detail.into(),
            details: Some(details),
        }
    }
}

/// Structured data attached to a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationDetails {
    /// Room too small.
    Capacity {
        room_capacity: u32,
        student_count: usize,
    },
    /// Room already taken at the timeslot.
    RoomBooking {
        room_id: String,
        timeslot_id: String,
        conflicting_exam_id: String,
    },
    /// Students shared with an exam at the same timeslot.
    StudentClash {
        timeslot_id: String,
        other_exam_id: String,
        shared_students: usize,
    },
    /// Timeslot is forbidden.
    ForbiddenSlot { timeslot_id: String },
    /// Invigilator unavailable or at the load limit.
    InvigilatorLoad {
        invigilator_id: String,
        current_load: u32,
        max_load: u32,
    },
    /// Invigilator already supervising at the timeslot.
    InvigilatorBooking {
        invigilator_id: String,
        timeslot_id: String,
    },
}

/// A failed check attributed to an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Violated rule.
    pub constraint: ConstraintKind,
    /// Human-readable description.
    pub message: String,
    /// Exam whose placement failed.
    pub exam_id: String,
    /// Structured data.
    pub details: ViolationDetails,
}

impl ConstraintViolation {
    /// Lifts a failed check into a violation. Returns `None` for passing checks.
    pub fn from_check(exam_id: &str, check: &CheckResult) -> Option<Self> {
        if check.ok {
            return None;
        }
        let details = check.details.clone()?;
        Some(Self {
            constraint: check.constraint,
            message: check.detail.clone(),
            exam_id: exam_id.to_string(),
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ConstraintKind::RoomCapacity.code(), "ROOM_CAPACITY");
        assert_eq!(ConstraintKind::InvigilatorLoad.to_string(), "INVIGILATOR_LOAD");
    }

    #[test]
    fn test_kind_serializes_as_code() {
        let json = serde_json::to_string(&ConstraintKind::StudentClash).unwrap();
        assert_eq!(json, "\"STUDENT_CLASH\"");
    }

    #[test]
    fn test_violation_from_check() {
        let pass = CheckResult::pass(ConstraintKind::ForbiddenSlot, "fine");
        assert!(ConstraintViolation::from_check("e1", &pass).is_none());

        let fail = CheckResult::fail(
            ConstraintKind::RoomCapacity,
            "too small",
            ViolationDetails::Capacity {
                room_capacity: 10,
                student_count: 50,
            },
        );
        let v = ConstraintViolation::from_check("e1", &fail).unwrap();
        assert_eq!(v.constraint, ConstraintKind::RoomCapacity);
        assert_eq!(v.exam_id, "e1");
        assert_eq!(v.message, "too small");
    }
}
