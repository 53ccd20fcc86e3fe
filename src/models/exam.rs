//! Exam and student models.
//!
//! An exam is the unit being placed: it needs one room, one timeslot and
//! one invigilator. Students are only used to derive which exams share
//! candidates (see [`crate::enrollment`]).

use serde::{Deserialize, Serialize};

/// An examination to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    /// Unique exam identifier.
    pub id: String,
    /// Course code (e.g., "CS101").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Sitting length in minutes (must be > 0).
    pub duration_minutes: u32,
    /// Enrolled student IDs, unique, in registration order.
    pub enrolled_students: Vec<String>,
}

impl Exam {
    /// Creates a new exam with a default 120 minute sitting.
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: String::new(),
            duration_minutes: 120,
            enrolled_students: Vec::new(),
        }
    }

    /// Sets the exam name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the sitting length.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Enrolls a student. Already-enrolled IDs are ignored.
    pub fn with_student(mut self, student_id: impl Into<String>) -> Self {
        let student_id = student_id.into();
        if !self.enrolled_students.contains(&student_id) {
            self.enrolled_students.push(student_id);
        }
        self
    }

    /// Enrolls several students.
    pub fn with_students<I, S>(self, student_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        student_ids
            .into_iter()
            .fold(self, |exam, id| exam.with_student(id))
    }

    /// Number of students in the enrollment list.
    #[inline]
    pub fn enrolled_count(&self) -> usize {
        self.enrolled_students.len()
    }
}

/// A student and the exams they are registered for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Internal identifier (matches `Exam::enrolled_students`).
    pub id: String,
    /// Institutional student number.
    pub student_id: String,
    /// Full name.
    pub name: String,
    /// Registered exam IDs.
    pub registered_exams: Vec<String>,
}

impl Student {
    /// Creates a new student.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            student_id: id.clone(),
            id,
            name: String::new(),
            registered_exams: Vec::new(),
        }
    }

    /// Sets the institutional student number.
    pub fn with_student_id(mut self, student_id: impl Into<String>) -> Self {
        self.student_id = student_id.into();
        self
    }

    /// Sets the student name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers the student for an exam.
    pub fn with_exam(mut self, exam_id: impl Into<String>) -> Self {
        let exam_id = exam_id.into();
        if !self.is_registered_for(&exam_id) {
            self.registered_exams.push(exam_id);
        }
        self
    }

    /// Whether the student sits a given exam.
    pub fn is_registered_for(&self, exam_id: &str) -> bool {
        self.registered_exams.iter().any(|e| e == exam_id)
    }
}
