//! Grazing schedules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_local_id;

/// One grazing year's schedule on a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub local_id: String,
    pub remote_id: Option<i64>,
    pub year: i64,
    pub notes: String,
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new(year: i64) -> Schedule {
        Schedule {
            local_id: new_local_id(),
            remote_id: None,
            year,
            notes: String::new(),
            entries: Vec::new(),
        }
    }
}

/// A livestock placement within a schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub local_id: String,
    /// Foreign key into the LIVESTOCK_TYPE reference table
    pub livestock_type_id: i64,
    /// Local id of the pasture being grazed
    pub pasture_local_id: String,
    pub livestock_count: i64,
    pub date_in: Option<DateTime<Utc>>,
    pub date_out: Option<DateTime<Utc>>,
}

impl ScheduleEntry {
    pub fn new() -> ScheduleEntry {
        ScheduleEntry {
            local_id: new_local_id(),
            livestock_type_id: -1,
            pasture_local_id: String::new(),
            livestock_count: 0,
            date_in: None,
            date_out: None,
        }
    }
}

impl Default for ScheduleEntry {
    fn default() -> Self {
        Self::new()
    }
}
