//! Domain records shared by the storage layer and the services
//!
//! Identifiers are plain integer newtypes allocated by the store, matching a
//! relational serial column. Assignment ids therefore also encode insertion
//! order, which the daily plan relies on for same-day tie breaking.

pub mod dosage;
pub mod report;
pub mod routine;

pub use dosage::Dosage;
pub use report::{Symptom, SymptomReport};
pub use routine::{Exercise, MediaKind, MediaRef, Routine, RoutineDraft, RoutineExercise};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Patient identifier, owned by user management
    PatientId
);
id_type!(RoutineId);
id_type!(ExerciseId);
id_type!(
    /// Assignment identifier; monotonically increasing per store
    AssignmentId
);
id_type!(ReportId);

/// Account status as managed by the clinic's approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    /// Registered, waiting for clinician approval
    Pending,
    Active,
    /// Deactivated by a clinician
    Inactive,
}

impl PatientStatus {
    /// Only approved, active patients may receive routines
    pub fn is_assignable(&self) -> bool {
        matches!(self, PatientStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Pending => "pending",
            PatientStatus::Active => "active",
            PatientStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub full_name: String,
    pub email: String,
    pub status: PatientStatus,
}

/// A routine bound to a patient on a calendar day
///
/// Never mutated in place: moving an assignment to another day is a delete
/// followed by a new assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub patient_id: PatientId,
    pub routine_id: RoutineId,
    pub date: NaiveDate,
}

/// Which days a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelector {
    All,
    Day(NaiveDate),
    /// Inclusive on both ends
    Range { from: NaiveDate, to: NaiveDate },
}

impl DateSelector {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            DateSelector::All => true,
            DateSelector::Day(day) => *day == date,
            DateSelector::Range { from, to } => *from <= date && date <= *to,
        }
    }
}

/// Calendar row shaped for the clinician's month view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub assignment_id: AssignmentId,
    pub date: NaiveDate,
    pub routine_name: String,
}
