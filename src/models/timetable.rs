//! Timetable (solution) model.
//!
//! A timetable is the set of exam placements produced by one scheduling
//! run: at most one [`ScheduleAssignment`] per exam.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One exam placed into a (room, timeslot, invigilator) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    /// Placed exam.
    pub exam_id: String,
    /// Assigned room.
    pub room_id: String,
    /// Assigned timeslot.
    pub timeslot_id: String,
    /// Assigned invigilator.
    pub invigilator_id: String,
    /// Students sitting the exam (resolved count at placement time).
    pub enrolled_count: usize,
    /// Why this placement was chosen.
    pub reason: String,
}

impl ScheduleAssignment {
    /// Creates an assignment without a reason.
    pub fn new(
        exam_id: impl Into<String>,
        room_id: impl Into<String>,
        timeslot_id: impl Into<String>,
        invigilator_id: impl Into<String>,
    ) -> Self {
        Self {
            exam_id: exam_id.into(),
            room_id: room_id.into(),
            timeslot_id: timeslot_id.into(),
            invigilator_id: invigilator_id.into(),
            enrolled_count: 0,
            reason: String::new(),
        }
    }

    /// Sets the enrolled count.
    pub fn with_enrolled(mut self, count: usize) -> Self {
        self.enrolled_count = count;
        self
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

/// The assignments of a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    /// Placements, in the order the search accepted them.
    pub assignments: Vec<ScheduleAssignment>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: ScheduleAssignment) {
        self.assignments.push(assignment);
    }

    /// Number of placed exams.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The placement of an exam.
    pub fn assignment_for_exam(&self, exam_id: &str) -> Option<&ScheduleAssignment> {
        self.assignments.iter().find(|a| a.exam_id == exam_id)
    }

    /// All placements supervised by an invigilator.
    pub fn assignments_for_invigilator(&self, invigilator_id: &str) -> Vec<&ScheduleAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.invigilator_id == invigilator_id)
            .collect()
    }

    /// Assignment count per invigilator (only invigilators that appear).
    pub fn invigilator_loads(&self) -> HashMap<String, usize> {
        let mut loads: HashMap<String, usize> = HashMap::new();
        for a in &self.assignments {
            *loads.entry(a.invigilator_id.clone()).or_insert(0) += 1;
        }
        loads
    }
}

impl From<Vec<ScheduleAssignment>> for Timetable {
    fn from(assignments: Vec<ScheduleAssignment>) -> Self {
        Self { assignments }
    }
}
