//! Agreement-graph decoding.

use serde_json::Value;
use tracing::warn;

use super::plan::decode_plan;
use super::value::{entries, opt_i64, opt_str, opt_utc_date};
use super::DecodeError;
use crate::model::agreement::{Agreement, Client, District, RangeUsageYear, Zone};

/// Decode the agreements payload (an array of agreement objects).
///
/// Agreements missing a mandatory start or end date are skipped and reported;
/// the rest of the batch is unaffected.
pub fn decode_agreements(payload: &Value) -> (Vec<Agreement>, Vec<DecodeError>) {
    let mut agreements = Vec::new();
    let mut anomalies = Vec::new();

    for node in entries(payload) {
        match decode_agreement(node) {
            Ok(agreement) => agreements.push(agreement),
            Err(anomaly) => {
                warn!(error = %anomaly, "skipping agreement");
                anomalies.push(anomaly);
            }
        }
    }

    (agreements, anomalies)
}

pub fn decode_agreement(node: &Value) -> Result<Agreement, DecodeError> {
    let agreement_id = opt_str(node, "id").unwrap_or_default();

    let start_date =
        opt_utc_date(node, "agreementStartDate").ok_or_else(|| DecodeError::MissingField {
            agreement_id: agreement_id.clone(),
            field: "agreementStartDate",
        })?;
    let end_date =
        opt_utc_date(node, "agreementEndDate").ok_or_else(|| DecodeError::MissingField {
            agreement_id: agreement_id.clone(),
            field: "agreementEndDate",
        })?;

    let mut agreement = Agreement {
        agreement_id: agreement_id.clone(),
        start_date,
        end_date,
        type_id: opt_i64(node, "agreementTypeId").unwrap_or(-1),
        exemption_status_id: opt_i64(node, "agreementExemptionStatusId").unwrap_or(-1),
        created_at: opt_utc_date(node, "createdAt"),
        updated_at: opt_utc_date(node, "updatedAt"),
        zone: decode_zone(&node["zone"]),
        clients: entries(&node["clients"]).into_iter().map(decode_client).collect(),
        range_usage_years: decode_usage_years(&node["usage"], &agreement_id),
        plan: None,
    };

    // At most one plan per agreement; the payload shape allows a list
    if let Some(plan_node) = entries(&node["plans"]).into_iter().next() {
        if opt_i64(plan_node, "id").is_some() {
            agreement.plan = Some(decode_plan(plan_node, &agreement));
        }
    }

    Ok(agreement)
}

fn decode_zone(node: &Value) -> Zone {
    let user = &node["user"];
    let given = opt_str(user, "givenName").unwrap_or_default();
    let family = opt_str(user, "familyName").unwrap_or_default();

    Zone {
        id: opt_i64(node, "id").unwrap_or(-1),
        code: opt_str(node, "code").unwrap_or_default(),
        district_id: opt_i64(node, "districtId").unwrap_or(-1),
        description: opt_str(node, "description").unwrap_or_default(),
        contact_name: format!("{} {}", given, family).trim().to_string(),
        contact_phone: opt_str(user, "phone").unwrap_or_default(),
        contact_email: opt_str(user, "email").unwrap_or_default(),
        district: decode_district(&node["district"]),
    }
}

fn decode_district(node: &Value) -> District {
    District {
        id: opt_i64(node, "id").unwrap_or(-1),
        code: opt_str(node, "code").unwrap_or_default(),
        description: opt_str(node, "description").unwrap_or_default(),
    }
}

fn decode_client(node: &Value) -> Client {
    Client {
        id: opt_str(node, "id").unwrap_or_default(),
        name: opt_str(node, "name").unwrap_or_default(),
        location_code: opt_str(node, "locationCode").unwrap_or_default(),
        start_date: opt_utc_date(node, "startDate"),
        client_type_code: opt_str(node, "clientTypeCode").unwrap_or_default(),
    }
}

fn decode_usage_years(node: &Value, agreement_id: &str) -> Vec<RangeUsageYear> {
    let mut years: Vec<RangeUsageYear> = entries(node)
        .into_iter()
        .map(|item| RangeUsageYear {
            id: opt_i64(item, "id").unwrap_or(-1),
            agreement_id: agreement_id.to_string(),
            year: opt_i64(item, "year").unwrap_or(0),
            auth_aums: opt_i64(item, "authorizedAum").unwrap_or(0),
            total_annual_use: opt_i64(item, "totalAnnualUse").unwrap_or(0),
            temp_increase: opt_i64(item, "temporaryIncrease").unwrap_or(0),
            total_non_use: opt_i64(item, "totalNonUse").unwrap_or(0),
        })
        .collect();
    years.sort_by_key(|usage| usage.year);
    years
}
