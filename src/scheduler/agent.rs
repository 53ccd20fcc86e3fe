//! The scheduling entry point.
//!
//! # Steps
//!
//! 1. Apply lock constraints: narrow the room, timeslot and invigilator
//!    pools (a pool narrowed to nothing falls back to the full pool) and
//!    partition priority exams to the front.
//! 2. Run the backtracking search.
//! 3. Compute metrics and the invigilator roster.
//!
//! Priority partitions the exam list; MCV orders within each partition.

use std::borrow::Cow;
use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enrollment::{Enrollment, EnrollmentIndex};
use crate::heuristics::ScoreWeights;
use crate::models::{
    ConflictRecord, Exam, Invigilator, LockConstraints, Room, SchedulerSettings, Student,
    Timeslot, Timetable, TraceEntry,
};
use crate::search::{BacktrackingSearch, ProgressCallback, SearchInput, SearchLimits};
use crate::validation::{validate_input, validate_students, ValidationError};

use super::kpi::{build_roster, RosterEntry, ScheduleMetrics};

/// Input container for scheduling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    /// Exams to schedule.
    pub exams: Vec<Exam>,
    pub rooms: Vec<Room>,
    pub timeslots: Vec<Timeslot>,
    pub invigilators: Vec<Invigilator>,
    /// Student registrations, merged with the exams' enrollment lists.
    pub students: Vec<Student>,
    /// Authoritative student counts by exam ID.
    pub student_counts: HashMap<String, usize>,
    pub settings: SchedulerSettings,
    pub lock: LockConstraints,
}

impl ScheduleRequest {
    /// Creates a new schedule request with default settings and no locks.
    pub fn new(
        exams: Vec<Exam>,
        rooms: Vec<Room>,
        timeslots: Vec<Timeslot>,
        invigilators: Vec<Invigilator>,
    ) -> Self {
        Self {
            exams,
            rooms,
            timeslots,
            invigilators,
            ..Self::default()
        }
    }

    /// Sets student registrations.
    pub fn with_students(mut self, students: Vec<Student>) -> Self {
        self.students = students;
        self
    }

    /// Records an authoritative student count for an exam.
    pub fn with_student_count(mut self, exam_id: impl Into<String>, count: usize) -> Self {
        self.student_counts.insert(exam_id.into(), count);
        self
    }

    /// Sets scheduler settings.
    pub fn with_settings(mut self, settings: SchedulerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets lock constraints.
    pub fn with_lock(mut self, lock: LockConstraints) -> Self {
        self.lock = lock;
        self
    }

    /// Enrollment index over the exams, student records and counts.
    pub fn enrollment_index(&self) -> EnrollmentIndex {
        EnrollmentIndex::from_exams(&self.exams)
            .with_students(&self.students)
            .with_counts(self.student_counts.iter().map(|(id, &n)| (id.as_str(), n)))
    }
}

/// Finished scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub success: bool,
    /// Empty on failure.
    pub timetable: Timetable,
    /// One entry per invigilator of the request, in input order.
    pub invigilator_roster: Vec<RosterEntry>,
    pub conflicts: Vec<ConflictRecord>,
    pub trace: Vec<TraceEntry>,
    pub metrics: ScheduleMetrics,
}

/// Errors from [`SchedulingAgent::try_schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Invalid scheduling input ({} issue(s)): {}", .0.len(), join_errors(.0))]
    InvalidInput(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Exam scheduling agent.
///
/// Infeasibility is not an error: [`schedule`](Self::schedule) always
/// returns a result, with `success = false` and the trace and conflicts
/// explaining the failure.
///
/// # Example
///
/// ```
/// use exam_schedule::models::{Exam, Invigilator, Room, Timeslot};
/// use exam_schedule::scheduler::{ScheduleRequest, SchedulingAgent};
///
/// let request = ScheduleRequest::new(
///     vec![
///         Exam::new("E1", "CS101").with_students(["s1", "s2"]),
///         Exam::new("E2", "CS102").with_students(["s2", "s3"]),
///     ],
///     vec![Room::new("R1", 30)],
///     vec![Timeslot::new("T1", "2024-05-15"), Timeslot::new("T2", "2024-05-15")],
///     vec![Invigilator::new("I1", 2), Invigilator::new("I2", 2)],
/// );
///
/// let result = SchedulingAgent::new().schedule(&request);
/// assert!(result.success);
/// assert_eq!(result.timetable.len(), 2);
/// assert_eq!(result.invigilator_roster.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchedulingAgent {
    search: BacktrackingSearch,
}

impl SchedulingAgent {
    /// Creates an agent with default weights and no search limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the candidate score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.search = self.search.with_weights(weights);
        self
    }

    /// Sets search limits.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.search = self.search.with_limits(limits);
        self
    }

    /// Schedules the request.
    pub fn schedule(&self, request: &ScheduleRequest) -> ScheduleResult {
        let index = request.enrollment_index();
        self.run(request, &index, None)
    }

    /// Schedules the request, reporting `(exams reached, total)` progress.
    pub fn schedule_with_progress(
        &self,
        request: &ScheduleRequest,
        progress: &mut ProgressCallback<'_>,
    ) -> ScheduleResult {
        let index = request.enrollment_index();
        self.run(request, &index, Some(progress))
    }

    /// Schedules the request against a caller-supplied enrollment source.
    ///
    /// `request.students` and `request.student_counts` are not consulted.
    pub fn schedule_using(
        &self,
        request: &ScheduleRequest,
        enrollment: &dyn Enrollment,
    ) -> ScheduleResult {
        self.run(request, enrollment, None)
    }

    /// Validates the request, then schedules it.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidInput`] with every integrity issue found.
    /// An infeasible but well-formed request is still `Ok`.
    pub fn try_schedule(
        &self,
        request: &ScheduleRequest,
    ) -> Result<ScheduleResult, ScheduleError> {
        let mut errors = Vec::new();
        if let Err(mut e) = validate_input(
            &request.exams,
            &request.rooms,
            &request.timeslots,
            &request.invigilators,
        ) {
            errors.append(&mut e);
        }
        if let Err(mut e) = validate_students(&request.students, &request.exams) {
            errors.append(&mut e);
        }
        if !errors.is_empty() {
            return Err(ScheduleError::InvalidInput(errors));
        }
        Ok(self.schedule(request))
    }

    fn run(
        &self,
        request: &ScheduleRequest,
        enrollment: &dyn Enrollment,
        progress: Option<&mut ProgressCallback<'_>>,
    ) -> ScheduleResult {
        let lock = &request.lock;
        let rooms = narrow(&request.rooms, |r| lock.allows_room(r), "room");
        let timeslots = narrow(&request.timeslots, |t| lock.allows_timeslot(t), "timeslot");
        let invigilators = narrow(
            &request.invigilators,
            |i| lock.allows_invigilator(i),
            "invigilator",
        );

        let input = SearchInput::new(
            &request.exams,
            &rooms,
            &timeslots,
            &invigilators,
            enrollment,
            &request.settings,
        )
        .with_priority(&lock.priority_exam_ids);

        let outcome = match progress {
            Some(progress) => self.search.run_with_progress(&input, progress),
            None => self.search.run(&input),
        };

        let timetable = Timetable::from(outcome.assignments);
        let metrics = ScheduleMetrics::calculate(&outcome.stats, &timetable, &request.rooms);
        let invigilator_roster = build_roster(&request.invigilators, &timetable);

        info!(
            "schedule {}: {}/{} exams placed, utilization {}%, load variance {}",
            if outcome.success { "complete" } else { "failed" },
            timetable.len(),
            request.exams.len(),
            metrics.average_room_utilization,
            metrics.invigilator_load_variance
        );

        ScheduleResult {
            success: outcome.success,
            timetable,
            invigilator_roster,
            conflicts: outcome.conflicts,
            trace: outcome.trace,
            metrics,
        }
    }
}

/// Keeps the entities passing `keep`, or the whole pool when none do.
fn narrow<'a, T: Clone>(pool: &'a [T], keep: impl Fn(&T) -> bool, what: &str) -> Cow<'a, [T]> {
    if pool.iter().all(&keep) {
        return Cow::Borrowed(pool);
    }
    let kept: Vec<T> = pool.iter().filter(|x| keep(*x)).cloned().collect();
    if kept.is_empty() {
        warn!("lock constraints exclude every {what}; using the full pool");
        Cow::Borrowed(pool)
    } else {
        Cow::Owned(kept)
    }
}
