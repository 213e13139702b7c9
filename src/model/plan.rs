//! Range use plans and their plan-level components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agreement::Agreement;
use super::new_local_id;
use super::pasture::Pasture;
use super::schedule::Schedule;

/// Workflow status of a plan.
///
/// `LocalDraft` marks a plan that exists only on this device; the merge
/// engine must never remove it, even when the owning agreement is replaced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanStatus {
    LocalDraft,
    ClientDraft,
    Created,
    Pending,
    Completed,
    Submitted,
    Unknown,
}

impl PlanStatus {
    pub fn is_local_draft(&self) -> bool {
        matches!(self, PlanStatus::LocalDraft)
    }

    /// Plans the server already knows about, whose status should be refreshed
    /// from the remote service during sync.
    pub fn is_submitted(&self) -> bool {
        !matches!(self, PlanStatus::LocalDraft | PlanStatus::Unknown)
    }

    /// Resolve a PLAN_STATUS reference row to a status, preferring the short
    /// code and falling back to the display name.
    pub fn from_reference(code: &str, name: &str) -> PlanStatus {
        match code {
            "C" => PlanStatus::Created,
            "P" => PlanStatus::Pending,
            "O" => PlanStatus::Completed,
            "D" => PlanStatus::ClientDraft,
            "S" => PlanStatus::Submitted,
            _ => match name.to_lowercase().as_str() {
                "created" => PlanStatus::Created,
                "pending" => PlanStatus::Pending,
                "completed" => PlanStatus::Completed,
                "client draft" => PlanStatus::ClientDraft,
                "submitted" => PlanStatus::Submitted,
                _ => PlanStatus::Unknown,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::LocalDraft => "LocalDraft",
            PlanStatus::ClientDraft => "ClientDraft",
            PlanStatus::Created => "Created",
            PlanStatus::Pending => "Pending",
            PlanStatus::Completed => "Completed",
            PlanStatus::Submitted => "Submitted",
            PlanStatus::Unknown => "Unknown",
        }
    }
}

/// A range use plan (RUP). Created locally as a `LocalDraft`, or decoded
/// from a downloaded agreement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub local_id: String,
    /// `None` until the plan has been uploaded
    pub remote_id: Option<i64>,
    pub agreement_id: String,
    pub status: PlanStatus,
    /// Status id as reported by the server, resolved against the PLAN_STATUS
    /// reference table when the plan is stored
    pub remote_status_id: Option<i64>,
    pub range_name: String,
    pub alt_business_name: String,
    pub plan_start: Option<DateTime<Utc>>,
    pub plan_end: Option<DateTime<Utc>>,
    pub notes: String,
    pub pastures: Vec<Pasture>,
    pub schedules: Vec<Schedule>,
    pub minister_issues: Vec<MinisterIssue>,
    pub additional_requirements: Vec<AdditionalRequirement>,
    pub livestock_ids: Vec<LivestockId>,
}

impl Plan {
    /// Create a fresh local draft against an agreement.
    pub fn new(agreement_id: &str) -> Plan {
        Plan {
            local_id: new_local_id(),
            remote_id: None,
            agreement_id: agreement_id.to_string(),
            status: PlanStatus::LocalDraft,
            remote_status_id: None,
            range_name: String::new(),
            alt_business_name: String::new(),
            plan_start: None,
            plan_end: None,
            notes: String::new(),
            pastures: Vec::new(),
            schedules: Vec::new(),
            minister_issues: Vec::new(),
            additional_requirements: Vec::new(),
            livestock_ids: Vec::new(),
        }
    }

    /// Copy the owning agreement's identity and term onto the plan.
    pub fn set_from_agreement(&mut self, agreement: &Agreement) {
        self.agreement_id = agreement.agreement_id.clone();
        self.plan_start = Some(agreement.start_date);
        self.plan_end = Some(agreement.end_date);
    }
}

/// An issue raised by the minister against a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinisterIssue {
    pub local_id: String,
    pub remote_id: Option<i64>,
    /// Foreign key into the MINISTER_ISSUE_TYPE reference table
    pub issue_type_id: i64,
    pub details: String,
    pub objective: String,
    /// Local ids of the pastures this issue applies to
    pub pasture_local_ids: Vec<String>,
    pub actions: Vec<MinisterIssueAction>,
}

impl MinisterIssue {
    pub fn new() -> MinisterIssue {
        MinisterIssue {
            local_id: new_local_id(),
            remote_id: None,
            issue_type_id: -1,
            details: String::new(),
            objective: String::new(),
            pasture_local_ids: Vec::new(),
            actions: Vec::new(),
        }
    }
}

impl Default for MinisterIssue {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinisterIssueAction {
    pub local_id: String,
    pub remote_id: Option<i64>,
    /// Foreign key into the MINISTER_ISSUE_ACTION_TYPE reference table
    pub action_type_id: i64,
    pub details: String,
}

impl MinisterIssueAction {
    pub fn new() -> MinisterIssueAction {
        MinisterIssueAction {
            local_id: new_local_id(),
            remote_id: None,
            action_type_id: -1,
            details: String::new(),
        }
    }
}

impl Default for MinisterIssueAction {
    fn default() -> Self {
        Self::new()
    }
}

/// A free-form extra requirement attached to a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdditionalRequirement {
    pub local_id: String,
    pub category: String,
    pub detail: String,
    pub url: String,
}

/// A livestock identifier (brand, tag) registered on a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LivestockId {
    pub local_id: String,
    /// Foreign key into the LIVESTOCK_IDENTIFIER_TYPE reference table
    pub identifier_type_id: i64,
    pub number: String,
    pub description: String,
}
