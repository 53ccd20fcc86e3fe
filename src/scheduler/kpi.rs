//! Timetable quality metrics and the invigilator roster.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total time | Search wall-clock duration (ms) |
//! | States explored | Candidate trials made by the search |
//! | Backtracks | Placements undone by the search |
//! | Avg room utilization | mean(enrolled / capacity) over assignments, as a rounded % |
//! | Invigilator load variance | Population variance of assignment counts per used invigilator |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Invigilator, Room, Timetable};
use crate::search::SearchStats;

/// Run metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Search wall-clock duration (ms).
    pub total_time_ms: i64,
    pub states_explored: usize,
    pub backtracks: usize,
    /// Whether a search limit stopped the run.
    pub aborted: bool,
    /// Mean seat utilization in percent (0..=100 for legal timetables).
    pub average_room_utilization: u32,
    /// Rounded to two decimals.
    pub invigilator_load_variance: f64,
}

impl ScheduleMetrics {
    /// Computes metrics from search statistics and the resulting timetable.
    ///
    /// # Arguments
    /// * `stats` - Statistics of the search that produced `timetable`.
    /// * `timetable` - The accepted assignments (empty on failure).
    /// * `rooms` - Every room of the run, used to look up capacities.
    pub fn calculate(stats: &SearchStats, timetable: &Timetable, rooms: &[Room]) -> Self {
        Self {
            total_time_ms: stats.elapsed_ms(),
            states_explored: stats.states_explored,
            backtracks: stats.backtracks,
            aborted: stats.aborted,
            average_room_utilization: average_room_utilization(timetable, rooms),
            invigilator_load_variance: invigilator_load_variance(timetable),
        }
    }
}

/// Mean of `enrolled / capacity` over assignments, as a rounded percentage.
///
/// Assignments in unknown or zero-capacity rooms are left out. Returns 0
/// for an empty timetable.
pub fn average_room_utilization(timetable: &Timetable, rooms: &[Room]) -> u32 {
    let capacities: HashMap<&str, u32> =
        rooms.iter().map(|r| (r.id.as_str(), r.capacity)).collect();

    let ratios: Vec<f64> = timetable
        .assignments
        .iter()
        .filter_map(|a| {
            capacities
                .get(a.room_id.as_str())
                .filter(|&&cap| cap > 0)
                .map(|&cap| a.enrolled_count as f64 / f64::from(cap))
        })
        .collect();

    if ratios.is_empty() {
        return 0;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    (mean * 100.0).round() as u32
}

/// Population variance of per-invigilator assignment counts, over the
/// invigilators holding at least one assignment. Rounded to two decimals.
pub fn invigilator_load_variance(timetable: &Timetable) -> f64 {
    let loads = timetable.invigilator_loads();
    if loads.is_empty() {
        return 0.0;
    }

    let n = loads.len() as f64;
    let mean = loads.values().map(|&c| c as f64).sum::<f64>() / n;
    let variance = loads
        .values()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    (variance * 100.0).round() / 100.0
}

/// One duty of an invigilator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlot {
    pub exam_id: String,
    pub timeslot_id: String,
    pub room_id: String,
}

/// Duties of one invigilator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub invigilator_id: String,
    pub invigilator_name: String,
    /// In timetable order; empty if unused.
    pub assignments: Vec<RosterSlot>,
    pub total: usize,
    /// The invigilator's load limit.
    pub max_per_day: u32,
}

/// Builds a roster entry for every invigilator, used or not, in input order.
pub fn build_roster(invigilators: &[Invigilator], timetable: &Timetable) -> Vec<RosterEntry> {
    invigilators
        .iter()
        .map(|inv| {
            let assignments: Vec<RosterSlot> = timetable
                .assignments_for_invigilator(&inv.id)
                .into_iter()
                .map(|a| RosterSlot {
                    exam_id: a.exam_id.clone(),
                    timeslot_id: a.timeslot_id.clone(),
                    room_id: a.room_id.clone(),
                })
                .collect();
            RosterEntry {
                invigilator_id: inv.id.clone(),
                invigilator_name: inv.label().to_string(),
                total: assignments.len(),
                assignments,
                max_per_day: inv.max_load,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleAssignment;

    fn timetable() -> Timetable {
        Timetable::from(vec![
            ScheduleAssignment::new("E1", "R1", "T1", "I1").with_enrolled(5),
            ScheduleAssignment::new("E2", "R2", "T1", "I2").with_enrolled(10),
            ScheduleAssignment::new("E3", "R1", "T2", "I1").with_enrolled(10),
        ])
    }

    #[test]
    fn test_room_utilization() {
        let rooms = vec![Room::new("R1", 10), Room::new("R2", 20)];
        // (0.5 + 0.5 + 1.0) / 3 = 0.6667
        assert_eq!(average_room_utilization(&timetable(), &rooms), 67);
        assert_eq!(average_room_utilization(&Timetable::new(), &rooms), 0);
    }

    #[test]
    fn test_utilization_skips_unknown_rooms() {
        let rooms = vec![Room::new("R1", 10)];
        // Only R1 assignments count: (0.5 + 1.0) / 2
        assert_eq!(average_room_utilization(&timetable(), &rooms), 75);
    }

    #[test]
    fn test_load_variance() {
        // Loads {I1: 2, I2: 1}: mean 1.5, variance 0.25
        assert!((invigilator_load_variance(&timetable()) - 0.25).abs() < 1e-10);
        assert_eq!(invigilator_load_variance(&Timetable::new()), 0.0);
    }

    #[test]
    fn test_roster_lists_every_invigilator() {
        let invigilators = vec![
            Invigilator::new("I1", 3).with_name("Dr. Lee"),
            Invigilator::new("I2", 2),
            Invigilator::new("I3", 1),
        ];
        let roster = build_roster(&invigilators, &timetable());

        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].invigilator_name, "Dr. Lee");
        assert_eq!(roster[0].total, 2);
        assert_eq!(roster[0].assignments[1].exam_id, "E3");
        assert_eq!(roster[0].max_per_day, 3);
        assert_eq!(roster[2].total, 0);
        assert!(roster[2].assignments.is_empty());
    }

    #[test]
    fn test_metrics_from_stats() {
        let stats = SearchStats {
            states_explored: 7,
            backtracks: 2,
            aborted: false,
            started_at_ms: 1_000,
            finished_at_ms: 1_250,
        };
        let rooms = vec![Room::new("R1", 10), Room::new("R2", 20)];
        let m = ScheduleMetrics::calculate(&stats, &timetable(), &rooms);
        assert_eq!(m.total_time_ms, 250);
        assert_eq!(m.states_explored, 7);
        assert_eq!(m.backtracks, 2);
        assert_eq!(m.average_room_utilization, 67);
    }
}
