//! Search audit trail.
//!
//! Every trial the search makes is written to an append-only list of
//! [`TraceEntry`] values. Rejected trials additionally produce a
//! [`ConflictRecord`]. Entries are never modified once pushed.

use serde::{Deserialize, Serialize};

use super::{CheckResult, ConstraintKind};

/// Exam ID used by the final DONE entry.
pub const ALL_EXAMS: &str = "ALL";

/// What happened at a trace step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceAction {
    /// A candidate is about to be evaluated.
    Try,
    /// The candidate passed every check and was placed.
    Accept,
    /// The candidate failed at least one check.
    Reject,
    /// A placement was undone because no completion existed below it.
    Backtrack,
    /// All exams were placed.
    Done,
}

/// The (room, timeslot, invigilator) triple of a trial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateRef {
    pub room_id: String,
    pub timeslot_id: String,
    pub invigilator_id: String,
}

impl CandidateRef {
    pub fn new(
        room_id: impl Into<String>,
        timeslot_id: impl Into<String>,
        invigilator_id: impl Into<String>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            timeslot_id: timeslot_id.into(),
            invigilator_id: invigilator_id.into(),
        }
    }
}

/// One audit-trail record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Step counter value. A TRY and its ACCEPT/REJECT share a step.
    pub step: usize,
    pub action: TraceAction,
    /// Exam concerned, or [`ALL_EXAMS`] for DONE.
    pub exam_id: String,
    /// Candidate triple for TRY/ACCEPT/REJECT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<CandidateRef>,
    /// Full ordered check list for ACCEPT/REJECT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<CheckResult>>,
    /// Human-readable note.
    pub note: String,
}

impl TraceEntry {
    /// Creates an entry with no candidate or checks.
    pub fn new(
        step: usize,
        action: TraceAction,
        exam_id: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            step,
            action,
            exam_id: exam_id.into(),
            candidate: None,
            checks: None,
            note: note.into(),
        }
    }

    /// Attaches the candidate triple.
    pub fn with_candidate(mut self, candidate: CandidateRef) -> Self {
        self.candidate = Some(candidate);
        self
    }

    /// Attaches the check list.
    pub fn with_checks(mut self, checks: Vec<CheckResult>) -> Self {
        self.checks = Some(checks);
        self
    }
}

/// A rejected trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Step of the REJECT entry.
    pub step: usize,
    pub exam_id: String,
    pub attempted: CandidateRef,
    /// First violated constraint.
    pub constraint: ConstraintKind,
    pub message: String,
}

/// Counts entries with a given action.
pub fn count_actions(trace: &[TraceEntry], action: TraceAction) -> usize {
    trace.iter().filter(|e| e.action == action).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let e = TraceEntry::new(3, TraceAction::Reject, "E1", "Rejected")
            .with_candidate(CandidateRef::new("R1", "T1", "I1"))
            .with_checks(vec![CheckResult::pass(ConstraintKind::RoomCapacity, "ok")]);

        assert_eq!(e.step, 3);
        assert_eq!(e.candidate.as_ref().unwrap().room_id, "R1");
        assert_eq!(e.checks.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_count_actions() {
        let trace = vec![
            TraceEntry::new(1, TraceAction::Try, "E1", ""),
            TraceEntry::new(1, TraceAction::Accept, "E1", ""),
            TraceEntry::new(2, TraceAction::Done, ALL_EXAMS, ""),
        ];
        assert_eq!(count_actions(&trace, TraceAction::Try), 1);
        assert_eq!(count_actions(&trace, TraceAction::Backtrack), 0);
    }

    #[test]
    fn test_action_serializes_upper_case() {
        let json = serde_json::to_string(&TraceAction::Backtrack).unwrap();
        assert_eq!(json, "\"BACKTRACK\"");
    }
}
