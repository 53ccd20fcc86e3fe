//! Student-registration lookups.
//!
//! The scheduler never owns student data. It asks an [`Enrollment`]
//! implementation two questions: how many students sit an exam, and
//! which students two exams have in common. [`EnrollmentIndex`] answers
//! both from exam enrollment lists and/or student registrations.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Exam, Student};

/// Read-only enrollment collaborator.
pub trait Enrollment {
    /// Authoritative student count for an exam, if one is known.
    ///
    /// May differ from `exam.enrolled_students.len()` when counts come
    /// from a separate (e.g., scaled) dataset.
    fn authoritative_count(&self, exam_id: &str) -> Option<usize>;

    /// Students registered for both exams, in a stable order.
    fn shared_students(&self, first_exam: &str, second_exam: &str) -> Vec<String>;

    /// Whether the two exams have at least one student in common.
    fn shares_students(&self, first_exam: &str, second_exam: &str) -> bool {
        !self.shared_students(first_exam, second_exam).is_empty()
    }
}

/// Student count of an exam: the authoritative count when present,
/// otherwise the length of its enrollment list.
pub fn resolve_student_count(enrollment: &dyn Enrollment, exam: &Exam) -> usize {
    enrollment
        .authoritative_count(&exam.id)
        .unwrap_or_else(|| exam.enrolled_count())
}

/// In-memory enrollment index: exam ID → set of student IDs.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentIndex {
    students_by_exam: HashMap<String, BTreeSet<String>>,
    counts: HashMap<String, usize>,
}

impl EnrollmentIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from exam enrollment lists.
    pub fn from_exams(exams: &[Exam]) -> Self {
        let mut index = Self::new();
        for exam in exams {
            index.add_exam(exam);
        }
        index
    }

    /// Builds the index from student registrations.
    pub fn from_students(students: &[Student]) -> Self {
        let mut index = Self::new();
        for student in students {
            index.add_student(student);
        }
        index
    }

    /// Merges an exam's enrollment list.
    pub fn add_exam(&mut self, exam: &Exam) {
        let set = self.students_by_exam.entry(exam.id.clone()).or_default();
        set.extend(exam.enrolled_students.iter().cloned());
    }

    /// Merges a student's registrations.
    pub fn add_student(&mut self, student: &Student) {
        for exam_id in &student.registered_exams {
            self.students_by_exam
                .entry(exam_id.clone())
                .or_default()
                .insert(student.id.clone());
        }
    }

    /// Records an authoritative count for an exam.
    pub fn set_count(&mut self, exam_id: impl Into<String>, count: usize) {
        self.counts.insert(exam_id.into(), count);
    }

    /// Builder: merges student registrations.
    pub fn with_students(mut self, students: &[Student]) -> Self {
        for student in students {
            self.add_student(student);
        }
        self
    }

    /// Builder: records authoritative counts.
    pub fn with_counts<I, S>(mut self, counts: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        for (exam_id, count) in counts {
            self.set_count(exam_id, count);
        }
        self
    }

    /// Students known for an exam.
    pub fn students_of(&self, exam_id: &str) -> Option<&BTreeSet<String>> {
        self.students_by_exam.get(exam_id)
    }
}

impl Enrollment for EnrollmentIndex {
    fn authoritative_count(&self, exam_id: &str) -> Option<usize> {
        self.counts.get(exam_id).copied()
    }

    fn shared_students(&self, first_exam: &str, second_exam: &str) -> Vec<String> {
        match (
            self.students_by_exam.get(first_exam),
            self.students_by_exam.get(second_exam),
        ) {
            (Some(a), Some(b)) => a.intersection(b).cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn shares_students(&self, first_exam: &str, second_exam: &str) -> bool {
        match (
            self.students_by_exam.get(first_exam),
            self.students_by_exam.get(second_exam),
        ) {
            (Some(a), Some(b)) => !a.is_disjoint(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exams() -> Vec<Exam> {
        vec![
            Exam::new("E1", "CS101").with_students(["s1", "s2", "s3"]),
            Exam::new("E2", "CS102").with_students(["s3", "s4"]),
            Exam::new("E3", "MA101").with_students(["s5"]),
        ]
    }

    #[test]
    fn test_shared_from_exams() {
        let index = EnrollmentIndex::from_exams(&exams());
        assert_eq!(index.shared_students("E1", "E2"), vec!["s3"]);
        assert!(index.shares_students("E2", "E1"));
        assert!(!index.shares_students("E1", "E3"));
        assert!(index.shared_students("E1", "E9").is_empty());
    }

    #[test]
    fn test_shared_from_students() {
        let students = vec![
            Student::new("s1").with_exam("E1").with_exam("E3"),
            Student::new("s2").with_exam("E1"),
            Student::new("s3").with_exam("E3").with_exam("E1"),
        ];
        let index = EnrollmentIndex::from_students(&students);
        assert_eq!(index.shared_students("E1", "E3"), vec!["s1", "s3"]);
        assert_eq!(index.students_of("E1").map(|s| s.len()), Some(3));
    }

    #[test]
    fn test_resolve_count_prefers_authoritative() {
        let exams = exams();
        let index = EnrollmentIndex::from_exams(&exams).with_counts([("E1", 85)]);
        assert_eq!(resolve_student_count(&index, &exams[0]), 85);
        assert_eq!(resolve_student_count(&index, &exams[1]), 2);
    }
}
