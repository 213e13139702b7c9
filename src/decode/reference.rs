//! Reference-table decoding.
//!
//! The reference endpoint returns one object keyed by table name, each value
//! a map of row index to fields. Rows with missing or mistyped fields keep
//! their defaults; type tables callers present as pick lists are sorted by
//! id for a deterministic display order.

use serde_json::Value;

use super::value::{entries, opt_bool, opt_f64, opt_i64, opt_str};
use crate::model::reference::{
    AgreementExemptionStatus, AgreementStatus, AgreementType, ClientType, LivestockIdentifierType,
    LivestockType, MinisterIssueActionType, MinisterIssueType, PlanStatusRow, ReferenceBundle,
    ReferenceTable,
};

/// Decode a full reference payload into typed rows.
pub fn decode_reference(payload: &Value) -> ReferenceBundle {
    ReferenceBundle {
        livestock_types: decode_livestock_types(&payload[ReferenceTable::LivestockType.as_str()]),
        agreement_types: decode_agreement_types(&payload[ReferenceTable::AgreementType.as_str()]),
        agreement_statuses: decode_agreement_statuses(
            &payload[ReferenceTable::AgreementStatus.as_str()],
        ),
        livestock_identifier_types: decode_livestock_identifier_types(
            &payload[ReferenceTable::LivestockIdentifierType.as_str()],
        ),
        client_types: decode_client_types(&payload[ReferenceTable::ClientType.as_str()]),
        plan_statuses: decode_plan_statuses(&payload[ReferenceTable::PlanStatus.as_str()]),
        agreement_exemption_statuses: decode_agreement_exemption_statuses(
            &payload[ReferenceTable::AgreementExemptionStatus.as_str()],
        ),
        minister_issue_types: decode_minister_issue_types(
            &payload[ReferenceTable::MinisterIssueType.as_str()],
        ),
        minister_issue_action_types: decode_minister_issue_action_types(
            &payload[ReferenceTable::MinisterIssueActionType.as_str()],
        ),
    }
}

pub fn decode_livestock_types(node: &Value) -> Vec<LivestockType> {
    let mut rows: Vec<LivestockType> = entries(node)
        .into_iter()
        .map(|item| LivestockType {
            id: opt_i64(item, "id").unwrap_or(-1),
            name: opt_str(item, "name").unwrap_or_default(),
            au_factor: opt_f64(item, "auFactor").unwrap_or(0.0),
        })
        .collect();
    rows.sort_by_key(|row| row.id);
    rows
}

pub fn decode_agreement_types(node: &Value) -> Vec<AgreementType> {
    entries(node)
        .into_iter()
        .map(|item| AgreementType {
            id: opt_i64(item, "id").unwrap_or(-1),
            description: opt_str(item, "description").unwrap_or_default(),
            // The service publishes this table's code under "auFactor"
            code: opt_str(item, "auFactor").unwrap_or_default(),
        })
        .collect()
}

pub fn decode_agreement_statuses(node: &Value) -> Vec<AgreementStatus> {
    entries(node)
        .into_iter()
        .map(|item| AgreementStatus {
            id: opt_i64(item, "id").unwrap_or(-1),
            name: opt_str(item, "name").unwrap_or_default(),
            code: opt_str(item, "code").unwrap_or_default(),
        })
        .collect()
}

pub fn decode_livestock_identifier_types(node: &Value) -> Vec<LivestockIdentifierType> {
    entries(node)
        .into_iter()
        .map(|item| LivestockIdentifierType {
            id: opt_i64(item, "id").unwrap_or(-1),
            description: opt_str(item, "description").unwrap_or_default(),
        })
        .collect()
}

pub fn decode_client_types(node: &Value) -> Vec<ClientType> {
    entries(node)
        .into_iter()
        .map(|item| ClientType {
            id: opt_i64(item, "id").unwrap_or(-1),
            description: opt_str(item, "description").unwrap_or_default(),
            code: opt_str(item, "code").unwrap_or_default(),
        })
        .collect()
}

pub fn decode_plan_statuses(node: &Value) -> Vec<PlanStatusRow> {
    entries(node)
        .into_iter()
        .map(|item| PlanStatusRow {
            id: opt_i64(item, "id").unwrap_or(-1),
            name: opt_str(item, "name").unwrap_or_default(),
            code: opt_str(item, "code").unwrap_or_default(),
        })
        .collect()
}

pub fn decode_agreement_exemption_statuses(node: &Value) -> Vec<AgreementExemptionStatus> {
    entries(node)
        .into_iter()
        .map(|item| AgreementExemptionStatus {
            id: opt_i64(item, "id").unwrap_or(-1),
            description: opt_str(item, "description").unwrap_or_default(),
            code: opt_str(item, "code").unwrap_or_default(),
        })
        .collect()
}

pub fn decode_minister_issue_types(node: &Value) -> Vec<MinisterIssueType> {
    let mut rows: Vec<MinisterIssueType> = entries(node)
        .into_iter()
        .map(|item| MinisterIssueType {
            id: opt_i64(item, "id").unwrap_or(-1),
            name: opt_str(item, "name").unwrap_or_default(),
            active: opt_bool(item, "active").unwrap_or(false),
        })
        .collect();
    rows.sort_by_key(|row| row.id);
    rows
}

pub fn decode_minister_issue_action_types(node: &Value) -> Vec<MinisterIssueActionType> {
    let mut rows: Vec<MinisterIssueActionType> = entries(node)
        .into_iter()
        .map(|item| MinisterIssueActionType {
            id: opt_i64(item, "id").unwrap_or(-1),
            name: opt_str(item, "name").unwrap_or(String::new()),
            active: opt_bool(item, "active").unwrap_or(false),
        })
        .collect();
    rows.sort_by_key(|row| row.id);
    rows
}
