//! Server-authoritative reference (lookup) tables.
//!
//! Rows are immutable after download and replaced wholesale on every
//! reference sync; they are never edited locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The reference tables the service publishes, keyed by their payload names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTable {
    LivestockType,
    AgreementType,
    AgreementStatus,
    LivestockIdentifierType,
    ClientType,
    PlanStatus,
    AgreementExemptionStatus,
    MinisterIssueType,
    MinisterIssueActionType,
}

impl ReferenceTable {
    /// The key used both in the remote payload and as the local table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceTable::LivestockType => "LIVESTOCK_TYPE",
            ReferenceTable::AgreementType => "AGREEMENT_TYPE",
            ReferenceTable::AgreementStatus => "AGREEMENT_STATUS",
            ReferenceTable::LivestockIdentifierType => "LIVESTOCK_IDENTIFIER_TYPE",
            ReferenceTable::ClientType => "CLIENT_TYPE",
            ReferenceTable::PlanStatus => "PLAN_STATUS",
            ReferenceTable::AgreementExemptionStatus => "AGREEMENT_EXEMPTION_STATUS",
            ReferenceTable::MinisterIssueType => "MINISTER_ISSUE_TYPE",
            ReferenceTable::MinisterIssueActionType => "MINISTER_ISSUE_ACTION_TYPE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LivestockType {
    pub id: i64,
    pub name: String,
    /// Animal unit factor relative to a cow/calf pair
    pub au_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgreementType {
    pub id: i64,
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgreementStatus {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LivestockIdentifierType {
    pub id: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientType {
    pub id: i64,
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanStatusRow {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgreementExemptionStatus {
    pub id: i64,
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinisterIssueType {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinisterIssueActionType {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

/// Everything one reference download yields. Replaced as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceBundle {
    pub livestock_types: Vec<LivestockType>,
    pub agreement_types: Vec<AgreementType>,
    pub agreement_statuses: Vec<AgreementStatus>,
    pub livestock_identifier_types: Vec<LivestockIdentifierType>,
    pub client_types: Vec<ClientType>,
    pub plan_statuses: Vec<PlanStatusRow>,
    pub agreement_exemption_statuses: Vec<AgreementExemptionStatus>,
    pub minister_issue_types: Vec<MinisterIssueType>,
    pub minister_issue_action_types: Vec<MinisterIssueActionType>,
}

/// Singleton record of when the last full sync and the last reference
/// download completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncDate {
    pub full_sync: DateTime<Utc>,
    pub ref_download: Option<DateTime<Utc>>,
}
