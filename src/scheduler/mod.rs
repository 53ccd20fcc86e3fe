//! The scheduling agent and run metrics.
//!
//! [`SchedulingAgent`] turns entity collections, settings and optional
//! lock constraints into a [`ScheduleResult`]: timetable, invigilator
//! roster, conflicts, full trace and metrics.
//!
//! # Metrics
//!
//! [`ScheduleMetrics`] reports search effort (time, states, backtracks),
//! mean room utilization and the spread of invigilator load.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling", European Journal of Operational Research 140(2)
//! - Carter, Laporte & Lee (1996), "Examination timetabling: Algorithmic
//!   strategies and applications"

mod agent;
mod kpi;

pub use agent::{ScheduleError, ScheduleRequest, ScheduleResult, SchedulingAgent};
pub use kpi::{
    average_room_utilization, build_roster, invigilator_load_variance, RosterEntry, RosterSlot,
    ScheduleMetrics,
};
