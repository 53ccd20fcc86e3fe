//! Timeslot model.
//!
//! A timeslot is an exam sitting on a calendar date. Dates and clock
//! times are kept as the caller supplies them (`YYYY-MM-DD`, `HH:MM`);
//! the core only compares dates for equality when counting daily
//! invigilator load.

use serde::{Deserialize, Serialize};

/// An exam sitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeslot {
    /// Unique timeslot identifier.
    pub id: String,
    /// Calendar date (`YYYY-MM-DD`).
    pub date: String,
    /// Start time (`HH:MM`).
    pub start_time: String,
    /// End time (`HH:MM`).
    pub end_time: String,
    /// Display label (e.g., "Morning").
    pub label: String,
    /// Whether exams should be kept out of this sitting.
    pub is_forbidden: bool,
}

impl Timeslot {
    /// Creates a non-forbidden timeslot on `date`.
    pub fn new(id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            start_time: String::new(),
            end_time: String::new(),
            label: String::new(),
            is_forbidden: false,
        }
    }

    /// Sets start and end clock times.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = start.into();
        self.end_time = end.into();
        self
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Marks the slot as forbidden.
    pub fn forbidden(mut self) -> Self {
        self.is_forbidden = true;
        self
    }

    /// Label used in trace notes: the label, or the ID when unlabeled.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    /// Whether both slots fall on the same calendar date.
    #[inline]
    pub fn same_day(&self, other: &Self) -> bool {
        self.date == other.date
    }
}
