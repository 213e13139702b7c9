//! Pastures and their plant communities.

use serde::{Deserialize, Serialize};

use super::new_local_id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pasture {
    pub local_id: String,
    pub remote_id: Option<i64>,
    pub name: String,
    /// Allowed animal unit months for this pasture
    pub allowed_aums: i64,
    /// Private land deduction, percent
    pub private_land_deduction: f64,
    pub grace_days: i64,
    pub notes: String,
    pub plant_communities: Vec<PlantCommunity>,
}

impl Pasture {
    pub fn new() -> Pasture {
        Pasture {
            local_id: new_local_id(),
            remote_id: None,
            name: String::new(),
            allowed_aums: -1,
            private_land_deduction: 0.0,
            grace_days: 3,
            notes: String::new(),
            plant_communities: Vec::new(),
        }
    }
}

impl Default for Pasture {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a plant community carries pasture actions. Server values are free
/// text; anything that is not recognizably "establish" or "maintain" means
/// no action is planned.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PurposeOfAction {
    Establish,
    Maintain,
    #[default]
    Clear,
}

impl PurposeOfAction {
    /// Normalize a server value by case-insensitive substring match.
    pub fn from_remote(raw: &str) -> PurposeOfAction {
        let lowered = raw.to_lowercase();
        if lowered.contains("establish") {
            PurposeOfAction::Establish
        } else if lowered.contains("maintain") {
            PurposeOfAction::Maintain
        } else {
            PurposeOfAction::Clear
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantCommunity {
    pub local_id: String,
    pub remote_id: Option<i64>,
    pub name: String,
    pub aspect: String,
    pub elevation: String,
    pub url: String,
    pub notes: String,
    pub approved_by_minister: bool,
    pub purpose_of_action: PurposeOfAction,
    /// Range readiness date, -1 when unset
    pub readiness_day: i64,
    pub readiness_month: i64,
    pub readiness_notes: String,
    pub shrub_use: f64,
    pub range_readiness: Vec<IndicatorPlant>,
    pub stubble_height: Vec<IndicatorPlant>,
    pub monitoring_areas: Vec<MonitoringArea>,
    pub pasture_actions: Vec<PastureAction>,
}

impl PlantCommunity {
    pub fn new() -> PlantCommunity {
        PlantCommunity {
            local_id: new_local_id(),
            remote_id: None,
            name: String::new(),
            aspect: String::new(),
            elevation: String::new(),
            url: String::new(),
            notes: String::new(),
            approved_by_minister: false,
            purpose_of_action: PurposeOfAction::Clear,
            readiness_day: -1,
            readiness_month: -1,
            readiness_notes: String::new(),
            shrub_use: 0.0,
            range_readiness: Vec::new(),
            stubble_height: Vec::new(),
            monitoring_areas: Vec::new(),
            pasture_actions: Vec::new(),
        }
    }
}

impl Default for PlantCommunity {
    fn default() -> Self {
        Self::new()
    }
}

/// A readiness or stubble-height indicator species.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorPlant {
    pub local_id: String,
    pub remote_id: Option<i64>,
    /// "rangereadiness" or "stubbleheight"
    pub criteria: String,
    pub name: String,
    pub value: f64,
}

impl IndicatorPlant {
    pub fn new(criteria: &str) -> IndicatorPlant {
        IndicatorPlant {
            local_id: new_local_id(),
            remote_id: None,
            criteria: criteria.to_string(),
            name: String::new(),
            value: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringArea {
    pub local_id: String,
    pub remote_id: Option<i64>,
    pub name: String,
    pub location: String,
    pub purpose: String,
}

impl MonitoringArea {
    pub fn new() -> MonitoringArea {
        MonitoringArea {
            local_id: new_local_id(),
            remote_id: None,
            name: String::new(),
            location: String::new(),
            purpose: String::new(),
        }
    }
}

impl Default for MonitoringArea {
    fn default() -> Self {
        Self::new()
    }
}

/// A planned range-improvement action on a plant community.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PastureAction {
    pub local_id: String,
    pub remote_id: Option<i64>,
    pub action: String,
    pub details: String,
    /// No-graze window, -1 when unset
    pub no_graze_start_day: i64,
    pub no_graze_start_month: i64,
    pub no_graze_end_day: i64,
    pub no_graze_end_month: i64,
}

impl PastureAction {
    pub fn new() -> PastureAction {
        PastureAction {
            local_id: new_local_id(),
            remote_id: None,
            action: String::new(),
            details: String::new(),
            no_graze_start_day: -1,
            no_graze_start_month: -1,
            no_graze_end_day: -1,
            no_graze_end_month: -1,
        }
    }
}

impl Default for PastureAction {
    fn default() -> Self {
        Self::new()
    }
}
