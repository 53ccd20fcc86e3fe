//! Scheduler settings and guided-scheduling locks.
//!
//! Both types deserialize from partial documents: missing fields take
//! their defaults, so a caller can persist only what it changes.

use serde::{Deserialize, Serialize};

use super::{Exam, Invigilator, Room, Timeslot};

/// How an invigilator's `max_load` is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadScope {
    /// Assignments on the candidate timeslot's date.
    #[default]
    PerDay,
    /// All assignments in the run.
    PerRun,
}

/// Optimization and feasibility switches for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Keep exams out of forbidden timeslots (filter and check).
    pub avoid_forbidden_timeslots: bool,
    /// Prefer least-loaded invigilators when ordering candidates.
    pub balance_invigilator_load: bool,
    /// Prefer tightest-fitting rooms when ordering candidates.
    pub minimize_room_wastage: bool,
    /// Counting window for `Invigilator::max_load`.
    pub load_scope: LoadScope,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            avoid_forbidden_timeslots: true,
            balance_invigilator_load: true,
            minimize_room_wastage: true,
            load_scope: LoadScope::PerDay,
        }
    }
}

impl SchedulerSettings {
    /// Settings with every switch off and per-run load counting.
    pub fn plain() -> Self {
        Self {
            avoid_forbidden_timeslots: false,
            balance_invigilator_load: false,
            minimize_room_wastage: false,
            load_scope: LoadScope::PerRun,
        }
    }

    pub fn with_avoid_forbidden(mut self, on: bool) -> Self {
        self.avoid_forbidden_timeslots = on;
        self
    }

    pub fn with_balance_load(mut self, on: bool) -> Self {
        self.balance_invigilator_load = on;
        self
    }

    pub fn with_minimize_wastage(mut self, on: bool) -> Self {
        self.minimize_room_wastage = on;
        self
    }

    pub fn with_load_scope(mut self, scope: LoadScope) -> Self {
        self.load_scope = scope;
        self
    }
}

/// Caller restrictions that narrow the candidate pools before search.
///
/// Empty lists mean "no restriction". A restriction that would leave a
/// pool empty is ignored for that pool. Locks never bypass hard
/// constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConstraints {
    pub room_ids: Vec<String>,
    pub dates: Vec<String>,
    pub timeslot_ids: Vec<String>,
    pub invigilator_ids: Vec<String>,
    /// Exams placed ahead of all others.
    pub priority_exam_ids: Vec<String>,
}

impl LockConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rooms<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.room_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_dates<I: IntoIterator<Item = S>, S: Into<String>>(mut self, dates: I) -> Self {
        self.dates.extend(dates.into_iter().map(Into::into));
        self
    }

    pub fn with_timeslots<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.timeslot_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_invigilators<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        ids: I,
    ) -> Self {
        self.invigilator_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_priority_exams<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        ids: I,
    ) -> Self {
        self.priority_exam_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Whether no restriction is set.
    pub fn is_empty(&self) -> bool {
        self.room_ids.is_empty()
            && self.dates.is_empty()
            && self.timeslot_ids.is_empty()
            && self.invigilator_ids.is_empty()
            && self.priority_exam_ids.is_empty()
    }

    /// Whether an exam is in the priority list.
    pub fn is_priority(&self, exam: &Exam) -> bool {
        self.priority_exam_ids.iter().any(|id| *id == exam.id)
    }

    /// Whether a room passes the room restriction.
    pub fn allows_room(&self, room: &Room) -> bool {
        self.room_ids.is_empty() || self.room_ids.contains(&room.id)
    }

    /// Timeslot passes both the ID and the date restriction.
    pub fn allows_timeslot(&self, timeslot: &Timeslot) -> bool {
        (self.timeslot_ids.is_empty() || self.timeslot_ids.contains(&timeslot.id))
            && (self.dates.is_empty() || self.dates.contains(&timeslot.date))
    }

    pub fn allows_invigilator(&self, invigilator: &Invigilator) -> bool {
        self.invigilator_ids.is_empty() || self.invigilator_ids.contains(&invigilator.id)
    }
}
