//! Merge policy: downloaded agreements versus the local cache.

use anyhow::Result;
use chrono::{TimeZone, Utc};

use rangesync::model::plan::{Plan, PlanStatus};
use rangesync::model::reference::{PlanStatusRow, ReferenceBundle};
use rangesync::model::{Agreement, Zone};
use rangesync::store::Store;
use rangesync::sync::merge::merge_agreements;

fn agreement(id: &str) -> Agreement {
    Agreement {
        agreement_id: id.to_string(),
        start_date: Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2023, 2, 28, 0, 0, 0).unwrap(),
        type_id: 1,
        exemption_status_id: -1,
        created_at: None,
        updated_at: None,
        zone: Zone::default(),
        clients: Vec::new(),
        range_usage_years: Vec::new(),
        plan: None,
    }
}

fn downloaded_plan(agreement: &Agreement) -> Plan {
    let mut plan = Plan::new(&agreement.agreement_id);
    plan.remote_id = Some(31);
    plan.status = PlanStatus::Unknown;
    plan.range_name = "Server copy".to_string();
    plan
}

fn plan_status_reference() -> ReferenceBundle {
    ReferenceBundle {
        plan_statuses: vec![
            PlanStatusRow {
                id: 1,
                name: "Created".to_string(),
                code: "C".to_string(),
            },
            PlanStatusRow {
                id: 2,
                name: "Submitted".to_string(),
                code: "S".to_string(),
            },
        ],
        ..Default::default()
    }
}

#[test]
fn local_draft_survives_a_replacing_download() -> Result<()> {
    let store = Store::open_in_memory()?;

    let mut first = agreement("RAN1");
    first.plan = Some(downloaded_plan(&first));
    merge_agreements(&store, vec![first])?;

    // User starts a draft on top of the synced agreement.
    let mut draft = Plan::new("RAN1");
    draft.range_name = "My draft".to_string();
    store.save_plan(&draft)?;

    // Next download carries a fresh shell and a fresh server-side plan.
    let mut second = agreement("RAN1");
    second.zone.code = "NEWZ".to_string();
    second.plan = Some(downloaded_plan(&second));
    let report = merge_agreements(&store, vec![second])?;
    assert_eq!(report.drafts_preserved, 1);
    assert_eq!(report.replaced, 1);

    // Shell refreshed, draft kept, downloaded plan discarded.
    let merged = store.agreement("RAN1")?.unwrap();
    assert_eq!(merged.zone.code, "NEWZ");
    let plan = merged.plan.unwrap();
    assert_eq!(plan.local_id, draft.local_id);
    assert_eq!(plan.range_name, "My draft");
    assert!(store.plan_by_remote_id(31)?.is_none());
    Ok(())
}

#[test]
fn synced_plan_is_replaced_by_the_download() -> Result<()> {
    let store = Store::open_in_memory()?;

    let mut first = agreement("RAN1");
    let mut old_plan = downloaded_plan(&first);
    old_plan.range_name = "Stale".to_string();
    let old_local_id = old_plan.local_id.clone();
    first.plan = Some(old_plan);
    merge_agreements(&store, vec![first])?;

    let mut second = agreement("RAN1");
    let mut new_plan = downloaded_plan(&second);
    new_plan.remote_id = Some(32);
    new_plan.range_name = "Fresh".to_string();
    second.plan = Some(new_plan);
    merge_agreements(&store, vec![second])?;

    let merged = store.agreement("RAN1")?.unwrap();
    let plan = merged.plan.unwrap();
    assert_eq!(plan.range_name, "Fresh");
    assert_ne!(plan.local_id, old_local_id);
    assert!(store.plan(&old_local_id)?.is_none());
    Ok(())
}

#[test]
fn agreements_absent_from_the_download_are_kept() -> Result<()> {
    let store = Store::open_in_memory()?;

    merge_agreements(&store, vec![agreement("RAN1"), agreement("RAN2")])?;

    // RAN2 disappears from the next batch; it stays cached locally.
    let report = merge_agreements(&store, vec![agreement("RAN1")])?;
    assert_eq!(report.replaced, 1);
    assert_eq!(report.added, 0);

    let ids: Vec<String> = store
        .agreements()?
        .into_iter()
        .map(|a| a.agreement_id)
        .collect();
    assert_eq!(ids, ["RAN1", "RAN2"]);
    Ok(())
}

#[test]
fn downloaded_plan_status_resolves_against_reference() -> Result<()> {
    let store = Store::open_in_memory()?;
    store.replace_reference(&plan_status_reference())?;

    let mut downloaded = agreement("RAN1");
    let mut plan = downloaded_plan(&downloaded);
    plan.remote_status_id = Some(2);
    downloaded.plan = Some(plan);
    merge_agreements(&store, vec![downloaded])?;

    let merged = store.agreement("RAN1")?.unwrap();
    assert_eq!(merged.plan.unwrap().status, PlanStatus::Submitted);

    // A resolved plan is eligible for the status-refresh stage.
    assert_eq!(store.submitted_plans()?.len(), 1);
    Ok(())
}

#[test]
fn unknown_status_id_stays_unknown() -> Result<()> {
    let store = Store::open_in_memory()?;
    store.replace_reference(&plan_status_reference())?;

    let mut downloaded = agreement("RAN1");
    let mut plan = downloaded_plan(&downloaded);
    plan.remote_status_id = Some(404);
    downloaded.plan = Some(plan);
    merge_agreements(&store, vec![downloaded])?;

    let merged = store.agreement("RAN1")?.unwrap();
    assert_eq!(merged.plan.unwrap().status, PlanStatus::Unknown);
    Ok(())
}
