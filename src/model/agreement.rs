//! Agreements and the static records attached to them at decode time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::Plan;

/// A grazing agreement downloaded from the remote service. The agreement id
/// is the server's authoritative key; agreements are never created locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agreement {
    pub agreement_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Foreign key into the AGREEMENT_TYPE reference table
    pub type_id: i64,
    /// Foreign key into the AGREEMENT_EXEMPTION_STATUS reference table
    pub exemption_status_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub zone: Zone,
    pub clients: Vec<Client>,
    /// Sorted ascending by year
    pub range_usage_years: Vec<RangeUsageYear>,
    pub plan: Option<Plan>,
}

/// Range zone with its district and staff contact details. Attached to an
/// agreement at decode time and never mutated independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub id: i64,
    pub code: String,
    pub district_id: i64,
    pub description: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub district: District,
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            id: -1,
            code: String::new(),
            district_id: -1,
            description: String::new(),
            contact_name: String::new(),
            contact_phone: String::new(),
            contact_email: String::new(),
            district: District::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct District {
    pub id: i64,
    pub code: String,
    pub description: String,
}

impl Default for District {
    fn default() -> Self {
        Self {
            id: -1,
            code: String::new(),
            description: String::new(),
        }
    }
}

/// An agreement holder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub location_code: String,
    pub start_date: Option<DateTime<Utc>>,
    pub client_type_code: String,
}

/// Authorized use for one grazing year, in animal unit months.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RangeUsageYear {
    pub id: i64,
    pub agreement_id: String,
    pub year: i64,
    pub auth_aums: i64,
    pub total_annual_use: i64,
    pub temp_increase: i64,
    pub total_non_use: i64,
}
