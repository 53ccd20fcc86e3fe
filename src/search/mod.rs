//! Backtracking search over exam placements.
//!
//! # State Space
//! - State: position in the MCV-ordered exam list plus the partial
//!   timetable accepted so far.
//! - Initial state: position 0, empty timetable.
//! - Action: place the exam at the current position into one
//!   (room, timeslot, invigilator) candidate.
//! - Goal: every exam placed with no contradiction on the accepted path.
//!
//! # Algorithm
//! Recursive depth-first search. For each exam the ordered candidates
//! are tried in turn; a candidate that fails any constraint is rejected
//! and the next one is tried. When no candidate for an exam leads to a
//! complete timetable the search undoes the previous placement and moves
//! on to that exam's next candidate. The first complete timetable found
//! is returned. No randomness is involved: identical inputs give an
//! identical result, trace included.
//!
//! Every trial is written to the trace (TRY, then ACCEPT or REJECT with
//! the full check list). Undone placements add a BACKTRACK entry and a
//! completed search ends with DONE.
//!
//! # Complexity
//! Exponential in the number of exams in the worst case; the ordering
//! heuristics only make early success likelier.
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//! Ch. 6.3 (backtracking search for CSPs)

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::constraints::{current_load, validate_assignment, ConstraintContext};
use crate::enrollment::{resolve_student_count, Enrollment};
use crate::heuristics::{
    generate_capacity_diagnostics, generate_candidates, order_exams, CandidatePools,
    ScoreWeights, ScoredCandidate,
};
use crate::models::{
    count_actions, ConflictRecord, Exam, Invigilator, Room, ScheduleAssignment,
    SchedulerSettings, Timeslot, TraceAction, TraceEntry, ALL_EXAMS,
};

/// Progress notification: `(exams reached, total exams)`.
///
/// Read-only; it cannot influence the search.
pub type ProgressCallback<'p> = dyn FnMut(usize, usize) + 'p;

/// Deterministic limits on a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Stop after this many trials. The run then fails with
    /// `stats.aborted = true`.
    pub max_states: Option<usize>,
}

impl SearchLimits {
    /// No limits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Limits the number of trials.
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }
}

/// Counters and timing of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Trials made (equals the number of TRY entries).
    pub states_explored: usize,
    /// Undone placements (equals the number of BACKTRACK entries).
    pub backtracks: usize,
    /// Whether a [`SearchLimits`] bound stopped the search.
    pub aborted: bool,
    /// Wall-clock start (ms since the Unix epoch).
    pub started_at_ms: i64,
    /// Wall-clock end (ms since the Unix epoch).
    pub finished_at_ms: i64,
}

impl SearchStats {
    /// Wall-clock duration of the search (ms).
    #[inline]
    pub fn elapsed_ms(&self) -> i64 {
        self.finished_at_ms - self.started_at_ms
    }
}

/// Outcome of a search.
///
/// A failed search is a normal result: `assignments` is empty and the
/// trace and conflicts explain every rejected path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub success: bool,
    /// The timetable found, empty on failure.
    pub assignments: Vec<ScheduleAssignment>,
    pub trace: Vec<TraceEntry>,
    pub conflicts: Vec<ConflictRecord>,
    pub stats: SearchStats,
}

impl SearchResult {
    /// Number of entries with a given action.
    pub fn action_count(&self, action: TraceAction) -> usize {
        count_actions(&self.trace, action)
    }
}

/// Read-only inputs of one search.
#[derive(Clone, Copy)]
pub struct SearchInput<'a> {
    /// Exams to place.
    pub exams: &'a [Exam],
    pub rooms: &'a [Room],
    pub timeslots: &'a [Timeslot],
    pub invigilators: &'a [Invigilator],
    pub enrollment: &'a dyn Enrollment,
    pub settings: &'a SchedulerSettings,
    /// Exams that form the leading partition of the search order.
    pub priority_exam_ids: &'a [String],
}

impl<'a> SearchInput<'a> {
    pub fn new(
        exams: &'a [Exam],
        rooms: &'a [Room],
        timeslots: &'a [Timeslot],
        invigilators: &'a [Invigilator],
        enrollment: &'a dyn Enrollment,
        settings: &'a SchedulerSettings,
    ) -> Self {
        Self {
            exams,
            rooms,
            timeslots,
            invigilators,
            enrollment,
            settings,
            priority_exam_ids: &[],
        }
    }

    /// Sets the priority exams.
    pub fn with_priority(mut self, priority_exam_ids: &'a [String]) -> Self {
        self.priority_exam_ids = priority_exam_ids;
        self
    }
}

impl std::fmt::Debug for SearchInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchInput")
            .field("exams", &self.exams.len())
            .field("rooms", &self.rooms.len())
            .field("timeslots", &self.timeslots.len())
            .field("invigilators", &self.invigilators.len())
            .field("settings", self.settings)
            .field("priority_exam_ids", &self.priority_exam_ids)
            .finish()
    }
}

/// Backtracking exam scheduler.
///
/// # Example
///
/// ```
/// use exam_schedule::enrollment::EnrollmentIndex;
/// use exam_schedule::models::{Exam, Invigilator, Room, SchedulerSettings, Timeslot};
/// use exam_schedule::search::{BacktrackingSearch, SearchInput};
///
/// let exams = vec![Exam::new("E1", "CS101").with_students(["s1", "s2"])];
/// let rooms = vec![Room::new("R1", 10)];
/// let timeslots = vec![Timeslot::new("T1", "2024-05-15")];
/// let invigilators = vec![Invigilator::new("I1", 1)];
/// let enrollment = EnrollmentIndex::from_exams(&exams);
/// let settings = SchedulerSettings::default();
///
/// let input = SearchInput::new(&exams, &rooms, &timeslots, &invigilators, &enrollment, &settings);
/// let result = BacktrackingSearch::new().run(&input);
/// assert!(result.success);
/// assert_eq!(result.assignments.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BacktrackingSearch {
    weights: ScoreWeights,
    limits: SearchLimits,
}

impl BacktrackingSearch {
    /// Creates a search with default weights and no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the candidate score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets search limits.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Runs the search.
    pub fn run(&self, input: &SearchInput<'_>) -> SearchResult {
        self.execute(input, None)
    }

    /// Runs the search, reporting progress each time an exam position is entered.
    pub fn run_with_progress(
        &self,
        input: &SearchInput<'_>,
        progress: &mut ProgressCallback<'_>,
    ) -> SearchResult {
        self.execute(input, Some(progress))
    }

    fn execute(
        &self,
        input: &SearchInput<'_>,
        progress: Option<&mut ProgressCallback<'_>>,
    ) -> SearchResult {
        let started_at_ms = now_ms();
        info!(
            "searching: {} exams, {} rooms, {} timeslots, {} invigilators",
            input.exams.len(),
            input.rooms.len(),
            input.timeslots.len(),
            input.invigilators.len()
        );

        let mut run = SearchRun {
            order: order_exams(
                input.exams,
                input.rooms,
                input.enrollment,
                input.priority_exam_ids,
            ),
            pools: CandidatePools {
                rooms: input.rooms,
                timeslots: input.timeslots,
                invigilators: input.invigilators,
            },
            enrollment: input.enrollment,
            settings: input.settings,
            weights: self.weights,
            limits: self.limits,
            context: ConstraintContext::from_settings(
                input.exams,
                input.timeslots,
                input.enrollment,
                input.settings,
            ),
            progress,
            trace: Vec::new(),
            conflicts: Vec::new(),
            step: 0,
            states_explored: 0,
            backtracks: 0,
            aborted: false,
        };

        let mut assignments = Vec::with_capacity(run.order.len());
        let mut simulated_loads: HashMap<String, u32> = HashMap::new();
        let outcome = run.descend(0, &mut assignments, &mut simulated_loads);
        let success = outcome == Descent::Solved;
        if !success {
            assignments.clear();
        }

        let stats = SearchStats {
            states_explored: run.states_explored,
            backtracks: run.backtracks,
            aborted: run.aborted,
            started_at_ms,
            finished_at_ms: now_ms(),
        };
        info!(
            "search {}: {} states explored, {} backtracks, {} conflicts",
            match outcome {
                Descent::Solved => "succeeded",
                Descent::Exhausted => "exhausted",
                Descent::Aborted => "aborted",
            },
            stats.states_explored,
            stats.backtracks,
            run.conflicts.len()
        );

        SearchResult {
            success,
            assignments,
            trace: run.trace,
            conflicts: run.conflicts,
            stats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Descent {
    Solved,
    Exhausted,
    Aborted,
}

/// Mutable bookkeeping of one search. The trace and conflict lists are
/// owned here and only ever appended to.
struct SearchRun<'r, 'p, 'a> {
    order: Vec<&'a Exam>,
    pools: CandidatePools<'a>,
    enrollment: &'a dyn Enrollment,
    settings: &'a SchedulerSettings,
    weights: ScoreWeights,
    limits: SearchLimits,
    context: ConstraintContext<'a>,
    progress: Option<&'r mut ProgressCallback<'p>>,
    trace: Vec<TraceEntry>,
    conflicts: Vec<ConflictRecord>,
    step: usize,
    states_explored: usize,
    backtracks: usize,
    aborted: bool,
}

impl<'a> SearchRun<'_, '_, 'a> {
    /// Places `order[index..]` on top of `assignments`.
    ///
    /// On `Solved`, `assignments` holds the full timetable. Otherwise it is
    /// restored to its state on entry, as is `simulated_loads`.
    fn descend(
        &mut self,
        index: usize,
        assignments: &mut Vec<ScheduleAssignment>,
        simulated_loads: &mut HashMap<String, u32>,
    ) -> Descent {
        let total = self.order.len();
        if index >= total {
            self.step += 1;
            self.trace.push(TraceEntry::new(
                self.step,
                TraceAction::Done,
                ALL_EXAMS,
                format!("Successfully scheduled all {total} exams"),
            ));
            return Descent::Solved;
        }

        let exam: &'a Exam = self.order[index];
        let candidates = self.candidates_for(exam, simulated_loads);

        if let Some(progress) = self.progress.as_deref_mut() {
            progress(index + 1, total);
        }

        for scored in candidates {
            if self.limit_reached() {
                warn!(
                    "search stopped after {} states (limit reached)",
                    self.states_explored
                );
                self.aborted = true;
                return Descent::Aborted;
            }

            let candidate = scored.candidate;
            let attempted = candidate.to_ref();
            self.step += 1;
            self.states_explored += 1;
            self.trace.push(
                TraceEntry::new(
                    self.step,
                    TraceAction::Try,
                    &exam.id,
                    format!(
                        "Trying {} in {} at {}",
                        exam.code,
                        candidate.room.label(),
                        candidate.timeslot.display_label()
                    ),
                )
                .with_candidate(attempted.clone()),
            );

            let validation = validate_assignment(&candidate, assignments, &self.context);

            if let Some(violation) = validation.first_violation() {
                trace!(
                    "step {}: reject {} -> {:?}: {}",
                    self.step,
                    exam.id,
                    attempted,
                    violation.message
                );
                let conflict = ConflictRecord {
                    step: self.step,
                    exam_id: exam.id.clone(),
                    attempted: attempted.clone(),
                    constraint: violation.constraint,
                    message: violation.message.clone(),
                };
                self.trace.push(
                    TraceEntry::new(
                        self.step,
                        TraceAction::Reject,
                        &exam.id,
                        format!("Rejected: {}", violation.message),
                    )
                    .with_candidate(attempted)
                    .with_checks(validation.checks),
                );
                self.conflicts.push(conflict);
                continue;
            }

            self.trace.push(
                TraceEntry::new(
                    self.step,
                    TraceAction::Accept,
                    &exam.id,
                    format!(
                        "Accepted: {} assigned to {}",
                        exam.code,
                        candidate.room.label()
                    ),
                )
                .with_candidate(attempted)
                .with_checks(validation.checks),
            );
            debug!(
                "step {}: placed {} ({}/{}) in {} at {} with {}",
                self.step,
                exam.id,
                index + 1,
                total,
                candidate.room.id,
                candidate.timeslot.id,
                candidate.invigilator.id
            );

            let load = current_load(
                candidate.invigilator,
                candidate.timeslot,
                assignments,
                &self.context,
            );
            let invigilator_id = &candidate.invigilator.id;
            assignments.push(
                ScheduleAssignment::new(
                    &exam.id,
                    &candidate.room.id,
                    &candidate.timeslot.id,
                    invigilator_id,
                )
                .with_enrolled(candidate.student_count)
                .with_reason(placement_reason(&scored, load)),
            );
            *simulated_loads.entry(invigilator_id.clone()).or_insert(0) += 1;

            match self.descend(index + 1, assignments, simulated_loads) {
                Descent::Solved => return Descent::Solved,
                Descent::Aborted => return Descent::Aborted,
                Descent::Exhausted => {}
            }

            assignments.pop();
            if let Some(load) = simulated_loads.get_mut(invigilator_id) {
                *load = load.saturating_sub(1);
            }
            self.backtracks += 1;
            self.step += 1;
            self.trace.push(TraceEntry::new(
                self.step,
                TraceAction::Backtrack,
                &exam.id,
                format!("Backtracking from {}, trying next candidate", exam.code),
            ));
            debug!("step {}: backtrack from {}", self.step, exam.id);
        }

        Descent::Exhausted
    }

    /// Ordered candidates for `exam`. When no available room is large
    /// enough, the undersized available rooms are returned instead so the
    /// failure shows up as ROOM_CAPACITY rejections. Unavailable rooms are
    /// never tried.
    fn candidates_for(
        &self,
        exam: &'a Exam,
        simulated_loads: &HashMap<String, u32>,
    ) -> Vec<ScoredCandidate<'a>> {
        let student_count = resolve_student_count(self.enrollment, exam);
        let candidates = generate_candidates(
            exam,
            student_count,
            &self.pools,
            simulated_loads,
            self.settings,
            &self.weights,
        );
        if !candidates.is_empty() {
            return candidates;
        }

        debug!(
            "no candidate for {} ({} students); trying undersized rooms for diagnostics",
            exam.id, student_count
        );
        generate_capacity_diagnostics(
            exam,
            student_count,
            &self.pools,
            simulated_loads,
            self.settings,
            &self.weights,
        )
    }

    fn limit_reached(&self) -> bool {
        self.limits
            .max_states
            .is_some_and(|max| self.states_explored >= max)
    }
}

/// Explanation stored on an accepted assignment. `load` is the
/// invigilator's load in the window the INVIGILATOR_LOAD check used.
fn placement_reason(scored: &ScoredCandidate<'_>, load: u32) -> String {
    let c = &scored.candidate;
    let capacity = c.room.capacity as usize;
    let spare_percent = if capacity == 0 {
        0
    } else {
        let spare = capacity.saturating_sub(c.student_count) as f64;
        (spare / capacity as f64 * 100.0).round() as i64
    };

    [
        format!(
            "Room {} selected: capacity {} for {} students ({}% spare)",
            c.room.label(),
            c.room.capacity,
            c.student_count,
            spare_percent
        ),
        format!(
            "Timeslot {} ({}): no student conflicts detected",
            c.timeslot.display_label(),
            c.timeslot.date
        ),
        format!(
            "{} assigned: {}/{} current load",
            c.invigilator.label(),
            load,
            c.invigilator.max_load
        ),
    ]
    .join(". ")
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
