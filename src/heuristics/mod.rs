//! Variable and value ordering for the backtracking search.
//!
//! # Variable ordering (Most-Constrained-Variable)
//! Exams with fewer rooms large enough to seat them go first; ties go to
//! the exam with more students. Priority exams form a leading partition
//! and MCV orders within each partition.
//!
//! # Value ordering (Least-Constraining-Value)
//! Candidates for one exam are sorted by [`candidate_score`], lower
//! first. The sort is stable, so equal scores keep cross-product order
//! (rooms, then timeslots, then invigilators, each in input order).
//!
//! # Score Convention
//! **Lower score = tried earlier.**
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//! Ch. 6.3 (variable and value ordering)

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::constraints::Candidate;
use crate::enrollment::{resolve_student_count, Enrollment};
use crate::models::{Exam, Invigilator, Room, SchedulerSettings, Timeslot};

/// Weights of the candidate score terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    /// Per empty seat (applied when minimizing room wastage).
    pub wastage: i64,
    /// Per assignment the invigilator already holds (applied when
    /// balancing invigilator load).
    pub load: i64,
    /// Per position of the timeslot in the supplied timeslot list.
    pub sequence: i64,
}

impl ScoreWeights {
    pub const DEFAULT_WASTAGE: i64 = 2;
    pub const DEFAULT_LOAD: i64 = 10;
    pub const DEFAULT_SEQUENCE: i64 = 1;
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            wastage: Self::DEFAULT_WASTAGE,
            load: Self::DEFAULT_LOAD,
            sequence: Self::DEFAULT_SEQUENCE,
        }
    }
}

/// A candidate with the data its score was computed from.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub candidate: Candidate<'a>,
    /// Position of the timeslot in the supplied timeslot list.
    pub sequence: usize,
    /// Assignments of the invigilator when the list was built: its
    /// pre-existing load plus placements made so far in the search.
    pub simulated_load: u32,
    pub score: i64,
}

/// Candidate score: lower is tried first.
///
/// - `wastage × (capacity − students)` if minimizing room wastage
/// - `load × simulated load` if balancing invigilator load
/// - `sequence × timeslot position`, always
pub fn candidate_score(
    room: &Room,
    student_count: usize,
    simulated_load: u32,
    sequence: usize,
    settings: &SchedulerSettings,
    weights: &ScoreWeights,
) -> i64 {
    let mut score = 0i64;
    if settings.minimize_room_wastage {
        let empty_seats = i64::from(room.capacity) - to_i64(student_count);
        score += weights.wastage * empty_seats;
    }
    if settings.balance_invigilator_load {
        score += weights.load * i64::from(simulated_load);
    }
    score + weights.sequence * to_i64(sequence)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Available rooms that seat `student_count`.
pub fn filter_rooms(rooms: &[Room], student_count: usize) -> Vec<&Room> {
    rooms
        .iter()
        .filter(|r| r.is_available() && r.fits(student_count))
        .collect()
}

/// Timeslots usable under `settings`, paired with their list position.
pub fn filter_timeslots<'a>(
    timeslots: &'a [Timeslot],
    settings: &SchedulerSettings,
) -> Vec<(usize, &'a Timeslot)> {
    timeslots
        .iter()
        .enumerate()
        .filter(|(_, t)| !(settings.avoid_forbidden_timeslots && t.is_forbidden))
        .collect()
}

/// Invigilators that are not unavailable.
pub fn filter_invigilators(invigilators: &[Invigilator]) -> Vec<&Invigilator> {
    invigilators.iter().filter(|i| i.is_assignable()).collect()
}

/// The entity pools candidates are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePools<'a> {
    pub rooms: &'a [Room],
    pub timeslots: &'a [Timeslot],
    pub invigilators: &'a [Invigilator],
}

/// Builds and orders every candidate for `exam`.
///
/// The set is the full cross product of the filtered pools; conflicts
/// with already-placed exams are left to the constraint evaluator.
/// `simulated_loads` maps invigilator ID → assignments held so far in
/// the search; each invigilator's `daily_load` is added on top.
pub fn generate_candidates<'a>(
    exam: &'a Exam,
    student_count: usize,
    pools: &CandidatePools<'a>,
    simulated_loads: &HashMap<String, u32>,
    settings: &SchedulerSettings,
    weights: &ScoreWeights,
) -> Vec<ScoredCandidate<'a>> {
    let rooms = filter_rooms(pools.rooms, student_count);
    cross_product(exam, student_count, &rooms, pools, simulated_loads, settings, weights)
}

/// Candidates for `exam` over the undersized available rooms.
///
/// Used when [`generate_candidates`] comes back empty, so that a stuck
/// exam still leaves ROOM_CAPACITY rejections in the audit trail. Rooms
/// that are in use or under maintenance are never offered, even when
/// they would be large enough; with no available room at all the exam
/// fails without any trial.
pub fn generate_capacity_diagnostics<'a>(
    exam: &'a Exam,
    student_count: usize,
    pools: &CandidatePools<'a>,
    simulated_loads: &HashMap<String, u32>,
    settings: &SchedulerSettings,
    weights: &ScoreWeights,
) -> Vec<ScoredCandidate<'a>> {
    let rooms: Vec<&Room> = pools
        .rooms
        .iter()
        .filter(|r| r.is_available() && !r.fits(student_count))
        .collect();
    cross_product(exam, student_count, &rooms, pools, simulated_loads, settings, weights)
}

fn cross_product<'a>(
    exam: &'a Exam,
    student_count: usize,
    rooms: &[&'a Room],
    pools: &CandidatePools<'a>,
    simulated_loads: &HashMap<String, u32>,
    settings: &SchedulerSettings,
    weights: &ScoreWeights,
) -> Vec<ScoredCandidate<'a>> {
    let timeslots = filter_timeslots(pools.timeslots, settings);
    let invigilators = filter_invigilators(pools.invigilators);

    let mut candidates = Vec::with_capacity(rooms.len() * timeslots.len() * invigilators.len());
    for &room in rooms {
        for &(sequence, timeslot) in &timeslots {
            for &invigilator in &invigilators {
                let simulated_load = simulated_loads
                    .get(&invigilator.id)
                    .copied()
                    .unwrap_or(0)
                    .saturating_add(invigilator.daily_load);
                candidates.push(ScoredCandidate {
                    candidate: Candidate::new(exam, room, timeslot, invigilator, student_count),
                    sequence,
                    simulated_load,
                    score: candidate_score(
                        room,
                        student_count,
                        simulated_load,
                        sequence,
                        settings,
                        weights,
                    ),
                });
            }
        }
    }

    candidates.sort_by_key(|c| c.score);
    candidates
}

/// Number of rooms (any availability) with capacity ≥ `student_count`.
pub fn fitting_room_count(rooms: &[Room], student_count: usize) -> usize {
    rooms.iter().filter(|r| r.fits(student_count)).count()
}

/// Orders exams for search: priority partition first, then MCV within
/// each partition, then input order.
pub fn order_exams<'a>(
    exams: &'a [Exam],
    rooms: &[Room],
    enrollment: &dyn Enrollment,
    priority_exam_ids: &[String],
) -> Vec<&'a Exam> {
    let mut keyed: Vec<((bool, usize, Reverse<usize>), &'a Exam)> = exams
        .iter()
        .map(|exam| {
            let count = resolve_student_count(enrollment, exam);
            let is_priority = priority_exam_ids.iter().any(|id| *id == exam.id);
            (
                (!is_priority, fitting_room_count(rooms, count), Reverse(count)),
                exam,
            )
        })
        .collect();

    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, exam)| exam).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::EnrollmentIndex;
    use crate::models::{InvigilatorAvailability, RoomAvailability};

    fn ids(exams: &[&Exam]) -> Vec<String> {
        exams.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_candidate_score_terms() {
        let room = Room::new("R", 50);
        let all = SchedulerSettings::default();
        let w = ScoreWeights::default();

        // 2 × 10 empty seats + 10 × 1 load + 3.
        assert_eq!(candidate_score(&room, 40, 1, 3, &all, &w), 33);

        let plain = SchedulerSettings::plain();
        assert_eq!(candidate_score(&room, 40, 1, 3, &plain, &w), 3);
    }

    #[test]
    fn test_filters() {
        let rooms = vec![
            Room::new("R1", 10),
            Room::new("R2", 100),
            Room::new("R3", 100).with_availability(RoomAvailability::Maintenance),
        ];
        assert_eq!(filter_rooms(&rooms, 50).len(), 1);
        assert_eq!(fitting_room_count(&rooms, 50), 2);

        let slots = vec![
            Timeslot::new("T1", "d1"),
            Timeslot::new("T2", "d1").forbidden(),
            Timeslot::new("T3", "d2"),
        ];
        let kept = filter_timeslots(&slots, &SchedulerSettings::default());
        assert_eq!(kept.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(filter_timeslots(&slots, &SchedulerSettings::plain()).len(), 3);

        let invs = vec![
            Invigilator::new("I1", 1),
            Invigilator::new("I2", 1).with_availability(InvigilatorAvailability::Limited),
            Invigilator::new("I3", 1).with_availability(InvigilatorAvailability::Unavailable),
        ];
        assert_eq!(filter_invigilators(&invs).len(), 2);
    }

    #[test]
    fn test_generate_prefers_tight_rooms_and_idle_invigilators() {
        let exam = Exam::new("E1", "CS101");
        let rooms = vec![Room::new("big", 100), Room::new("tight", 32)];
        let slots = vec![Timeslot::new("T1", "d1"), Timeslot::new("T2", "d1")];
        let invs = vec![Invigilator::new("busy", 5), Invigilator::new("idle", 5)];
        let pools = CandidatePools {
            rooms: &rooms,
            timeslots: &slots,
            invigilators: &invs,
        };
        let loads: HashMap<String, u32> = [("busy".to_string(), 2)].into_iter().collect();

        let cands = generate_candidates(
            &exam,
            30,
            &pools,
            &loads,
            &SchedulerSettings::default(),
            &ScoreWeights::default(),
        );

        assert_eq!(cands.len(), 8);
        let first = &cands[0].candidate;
        assert_eq!(first.room.id, "tight");
        assert_eq!(first.timeslot.id, "T1");
        assert_eq!(first.invigilator.id, "idle");
        assert!(cands.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn test_preexisting_load_lowers_preference() {
        let exam = Exam::new("E1", "CS101");
        let rooms = vec![Room::new("R1", 10)];
        let slots = vec![Timeslot::new("T1", "d1")];
        let invs = vec![
            Invigilator::new("held", 5).with_daily_load(2),
            Invigilator::new("fresh", 5),
        ];
        let pools = CandidatePools {
            rooms: &rooms,
            timeslots: &slots,
            invigilators: &invs,
        };

        let cands = generate_candidates(
            &exam,
            5,
            &pools,
            &HashMap::new(),
            &SchedulerSettings::default(),
            &ScoreWeights::default(),
        );
        assert_eq!(cands[0].candidate.invigilator.id, "fresh");
        assert_eq!(cands[1].simulated_load, 2);
    }

    #[test]
    fn test_generate_is_empty_without_fitting_room() {
        let exam = Exam::new("E1", "X");
        let rooms = vec![Room::new("R1", 10)];
        let slots = vec![Timeslot::new("T1", "d1")];
        let invs = vec![Invigilator::new("I1", 1)];
        let pools = CandidatePools {
            rooms: &rooms,
            timeslots: &slots,
            invigilators: &invs,
        };
        let s = SchedulerSettings::default();
        let w = ScoreWeights::default();

        assert!(generate_candidates(&exam, 50, &pools, &HashMap::new(), &s, &w).is_empty());
        let diag = generate_capacity_diagnostics(&exam, 50, &pools, &HashMap::new(), &s, &w);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag[0].candidate.room.id, "R1");
    }

    #[test]
    fn test_diagnostics_skip_unavailable_rooms() {
        let exam = Exam::new("E1", "X");
        let rooms = vec![
            Room::new("R_small", 10),
            Room::new("R_hall", 100).with_availability(RoomAvailability::InUse),
        ];
        let slots = vec![Timeslot::new("T1", "d1")];
        let invs = vec![Invigilator::new("I1", 1)];
        let s = SchedulerSettings::default();
        let w = ScoreWeights::default();
        let pools = CandidatePools {
            rooms: &rooms,
            timeslots: &slots,
            invigilators: &invs,
        };

        let diag = generate_capacity_diagnostics(&exam, 50, &pools, &HashMap::new(), &s, &w);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag[0].candidate.room.id, "R_small");

        let closed = &rooms[1..];
        let pools = CandidatePools {
            rooms: closed,
            timeslots: &slots,
            invigilators: &invs,
        };
        let none = generate_capacity_diagnostics(&exam, 50, &pools, &HashMap::new(), &s, &w);
        assert!(none.is_empty());
    }

    #[test]
    fn test_order_exams_mcv() {
        let exams = vec![
            Exam::new("small", "A").with_students(["s1"]),
            Exam::new("large", "B").with_students(["s1", "s2", "s3"]),
            Exam::new("medium", "C").with_students(["s1", "s2"]),
        ];
        let rooms = vec![Room::new("R1", 1), Room::new("R2", 3), Room::new("R3", 3)];
        let index = EnrollmentIndex::from_exams(&exams);

        let ordered = order_exams(&exams, &rooms, &index, &[]);
        // large: 2 rooms, medium: 2 rooms (fewer students), small: 3 rooms.
        assert_eq!(ids(&ordered), vec!["large", "medium", "small"]);
    }

    #[test]
    fn test_order_exams_priority_partition() {
        let exams = vec![
            Exam::new("small", "A").with_students(["s1"]),
            Exam::new("large", "B").with_students(["s1", "s2", "s3"]),
            Exam::new("tiny", "C"),
        ];
        let rooms = vec![Room::new("R1", 1), Room::new("R2", 3)];
        let index = EnrollmentIndex::from_exams(&exams);
        let priority = vec!["tiny".to_string(), "small".to_string()];

        let ordered = order_exams(&exams, &rooms, &index, &priority);
        // Priority partition ordered by MCV: small (1 student) before tiny (0).
        assert_eq!(ids(&ordered), vec!["small", "tiny", "large"]);
    }

    #[test]
    fn test_order_uses_authoritative_count() {
        let exams = vec![
            Exam::new("E1", "A").with_students(["s1"]),
            Exam::new("E2", "B").with_students(["s1"]),
        ];
        let rooms = vec![Room::new("R1", 10), Room::new("R2", 100)];
        let index = EnrollmentIndex::from_exams(&exams).with_counts([("E2", 80)]);

        let ordered = order_exams(&exams, &rooms, &index, &[]);
        assert_eq!(ids(&ordered), vec!["E2", "E1"]);
    }
}
