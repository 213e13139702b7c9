//! Upload locally-created plans.
//!
//! A plan with no remote id is in the outbox. Upload order matters: the
//! plan first (the response carries the assigned remote id), then pastures,
//! then schedules and minister issues, which reference pasture remote ids.
//! Each assigned remote id is persisted immediately so a failure mid-plan
//! leaves the already-uploaded pieces linked rather than duplicated on the
//! next run.

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::SyncError;
use crate::api::RemoteApi;
use crate::decode::value::format_utc;
use crate::model::pasture::Pasture;
use crate::model::plan::{MinisterIssue, Plan};
use crate::model::schedule::Schedule;
use crate::store::Store;

/// Upload every outbox plan. A failure mid-plan abandons that plan's
/// remaining uploads only; the other drafts still get their turn. Returns
/// how many plans uploaded cleanly.
pub async fn upload_outbox(store: &Store, api: &dyn RemoteApi) -> Result<usize, SyncError> {
    let plans = store.outbox_plans()?;
    let mut uploaded = 0;
    for plan in &plans {
        match upload_plan(store, api, plan).await {
            Ok(()) => uploaded += 1,
            Err(error) => {
                warn!(local_id = %plan.local_id, error = %error, "plan upload failed");
            }
        }
    }
    if uploaded > 0 {
        info!(count = uploaded, "uploaded outbox plans");
    }
    Ok(uploaded)
}

async fn upload_plan(store: &Store, api: &dyn RemoteApi, plan: &Plan) -> Result<(), SyncError> {
    let response = api.add_plan(plan_params(plan)).await?;
    let plan_remote_id = remote_id_of(&response, "plan")?;
    store.set_plan_remote_id(&plan.local_id, plan_remote_id)?;
    debug!(local_id = %plan.local_id, remote_id = plan_remote_id, "plan uploaded");

    // pasture local id -> remote id, for schedules and issues below
    let mut pasture_ids: HashMap<String, i64> = HashMap::new();
    for pasture in &plan.pastures {
        let response = api.add_pasture(plan_remote_id, pasture_params(pasture)).await?;
        let remote_id = remote_id_of(&response, "pasture")?;
        store.set_pasture_remote_id(&pasture.local_id, remote_id)?;
        pasture_ids.insert(pasture.local_id.clone(), remote_id);
    }

    for schedule in &plan.schedules {
        let params = schedule_params(plan_remote_id, schedule, &pasture_ids);
        let response = api.add_schedule(plan_remote_id, params).await?;
        let remote_id = remote_id_of(&response, "schedule")?;
        store.set_schedule_remote_id(&schedule.local_id, remote_id)?;
    }

    for issue in &plan.minister_issues {
        let response = api
            .add_issue(plan_remote_id, issue_params(issue, &pasture_ids))
            .await?;
        let issue_remote_id = remote_id_of(&response, "minister issue")?;
        store.set_issue_remote_id(&issue.local_id, issue_remote_id)?;

        for action in &issue.actions {
            let params = json!({
                "actionTypeId": action.action_type_id,
                "detail": action.details,
            });
            api.add_issue_action(plan_remote_id, issue_remote_id, params).await?;
        }
    }

    Ok(())
}

fn remote_id_of(response: &Value, entity: &str) -> Result<i64, SyncError> {
    response["id"]
        .as_i64()
        .ok_or_else(|| SyncError::Transport(format!("{} upload response missing id", entity)))
}

fn plan_params(plan: &Plan) -> Value {
    json!({
        "agreementId": plan.agreement_id,
        "rangeName": plan.range_name,
        "altBusinessName": plan.alt_business_name,
        "planStartDate": plan.plan_start.as_ref().map(format_utc),
        "planEndDate": plan.plan_end.as_ref().map(format_utc),
        "notes": plan.notes,
    })
}

fn pasture_params(pasture: &Pasture) -> Value {
    json!({
        "name": pasture.name,
        "allowableAum": pasture.allowed_aums,
        "pldPercent": pasture.private_land_deduction,
        "graceDays": pasture.grace_days,
        "notes": pasture.notes,
    })
}

fn schedule_params(
    plan_remote_id: i64,
    schedule: &Schedule,
    pasture_ids: &HashMap<String, i64>,
) -> Value {
    let entries: Vec<Value> = schedule
        .entries
        .iter()
        .map(|entry| {
            json!({
                "livestockTypeId": entry.livestock_type_id,
                "livestockCount": entry.livestock_count,
                "dateIn": entry.date_in.as_ref().map(format_utc),
                "dateOut": entry.date_out.as_ref().map(format_utc),
                "pastureId": pasture_ids.get(&entry.pasture_local_id),
            })
        })
        .collect();

    json!({
        "planId": plan_remote_id,
        "year": schedule.year,
        "narative": schedule.notes,
        "grazingScheduleEntries": entries,
    })
}

fn issue_params(issue: &MinisterIssue, pasture_ids: &HashMap<String, i64>) -> Value {
    let pastures: Vec<i64> = issue
        .pasture_local_ids
        .iter()
        .filter_map(|local_id| pasture_ids.get(local_id).copied())
        .collect();

    json!({
        "issueTypeId": issue.issue_type_id,
        "detail": issue.details,
        "objective": issue.objective,
        "pastures": pastures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schedule::ScheduleEntry;

    #[test]
    fn schedule_entries_carry_pasture_remote_ids() {
        let mut schedule = Schedule::new(2024);
        let mut entry = ScheduleEntry::new();
        entry.pasture_local_id = "local-a".to_string();
        entry.livestock_count = 40;
        schedule.entries.push(entry);

        let mut ids = HashMap::new();
        ids.insert("local-a".to_string(), 99_i64);

        let params = schedule_params(7, &schedule, &ids);
        assert_eq!(params["planId"], 7);
        assert_eq!(params["grazingScheduleEntries"][0]["pastureId"], 99);
        assert_eq!(params["grazingScheduleEntries"][0]["livestockCount"], 40);
    }

    #[test]
    fn issue_params_drop_pastures_without_remote_ids() {
        let mut issue = MinisterIssue::new();
        issue.pasture_local_ids = vec!["known".to_string(), "unknown".to_string()];

        let mut ids = HashMap::new();
        ids.insert("known".to_string(), 5_i64);

        let params = issue_params(&issue, &ids);
        assert_eq!(params["pastures"], json!([5]));
    }
}
