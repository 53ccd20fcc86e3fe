//! Room and invigilator models.
//!
//! Rooms and invigilators are the two resources an exam consumes besides
//! its timeslot. Both carry an availability state that the candidate
//! generator filters on before search starts.

use serde::{Deserialize, Serialize};

/// An examination room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Seats available (must be > 0).
    pub capacity: u32,
    /// Building the room belongs to.
    pub building: String,
    /// Current availability.
    pub availability: RoomAvailability,
}

/// Room availability state.
///
/// Only [`RoomAvailability::Available`] rooms are offered to the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomAvailability {
    /// Free for examinations.
    #[default]
    Available,
    /// Booked by something else for the exam period.
    InUse,
    /// Closed for maintenance.
    Maintenance,
}

/// An invigilator (exam supervisor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invigilator {
    /// Unique invigilator identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Current availability.
    pub availability: InvigilatorAvailability,
    /// Assignments already held before this run. Counted against
    /// `max_load` in every load window; never mutated by the search.
    pub daily_load: u32,
    /// Maximum assignments (must be > 0). Interpreted per day or per run
    /// depending on [`crate::models::LoadScope`].
    pub max_load: u32,
}

/// Invigilator availability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvigilatorAvailability {
    /// Fully available.
    #[default]
    Available,
    /// Available with restrictions; still eligible for assignment.
    Limited,
    /// Never assigned.
    Unavailable,
}

impl Room {
    /// Creates an available room.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            building: String::new(),
            availability: RoomAvailability::Available,
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the building.
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = building.into();
        self
    }

    /// Sets the availability state.
    pub fn with_availability(mut self, availability: RoomAvailability) -> Self {
        self.availability = availability;
        self
    }

    /// Whether the room can be offered to the search at all.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.availability == RoomAvailability::Available
    }

    /// Whether `students` fit in the room.
    #[inline]
    pub fn fits(&self, students: usize) -> bool {
        self.capacity as usize >= students
    }

    /// Label used in trace notes: the name, or the ID when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl Invigilator {
    /// Creates an available invigilator.
    pub fn new(id: impl Into<String>, max_load: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            availability: InvigilatorAvailability::Available,
            daily_load: 0,
            max_load,
        }
    }

    /// Sets the invigilator name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the availability state.
    pub fn with_availability(mut self, availability: InvigilatorAvailability) -> Self {
        self.availability = availability;
        self
    }

    /// Sets the pre-existing load.
    pub fn with_daily_load(mut self, daily_load: u32) -> Self {
        self.daily_load = daily_load;
        self
    }

    /// Whether the invigilator may be assigned at all.
    #[inline]
    pub fn is_assignable(&self) -> bool {
        self.availability != InvigilatorAvailability::Unavailable
    }

    /// Label used in trace notes: the name, or the ID when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
