//! Plan-graph persistence and cascade deletes.
//!
//! A plan row holds the plan's scalar fields; pastures, plant communities,
//! schedules, and minister issues live in their own tables keyed by the
//! owning entity's local id. Child rows are replaced whenever the plan is
//! saved again.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::StoreError;
use crate::model::pasture::{Pasture, PlantCommunity};
use crate::model::plan::{MinisterIssue, Plan, PlanStatus};
use crate::model::schedule::Schedule;

pub(crate) fn save_plan(conn: &Connection, plan: &Plan) -> Result<(), StoreError> {
    delete_plan_children(conn, &plan.local_id)?;

    let mut row = plan.clone();
    let pastures = std::mem::take(&mut row.pastures);
    let schedules = std::mem::take(&mut row.schedules);
    let issues = std::mem::take(&mut row.minister_issues);

    conn.execute(
        "INSERT OR REPLACE INTO plans (local_id, remote_id, agreement_id, status, data)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            row.local_id,
            row.remote_id,
            row.agreement_id,
            row.status.as_str(),
            serde_json::to_string(&row)?
        ],
    )?;

    for pasture in &pastures {
        save_pasture(conn, &row.local_id, pasture)?;
    }
    for schedule in &schedules {
        save_schedule(conn, &row.local_id, schedule)?;
    }
    for issue in &issues {
        save_issue(conn, &row.local_id, issue)?;
    }
    Ok(())
}

fn save_pasture(conn: &Connection, plan_id: &str, pasture: &Pasture) -> Result<(), StoreError> {
    let mut row = pasture.clone();
    let communities = std::mem::take(&mut row.plant_communities);

    conn.execute(
        "INSERT OR REPLACE INTO pastures (local_id, remote_id, plan_id, data)
         VALUES (?1, ?2, ?3, ?4)",
        params![row.local_id, row.remote_id, plan_id, serde_json::to_string(&row)?],
    )?;

    for community in &communities {
        save_plant_community(conn, &row.local_id, community)?;
    }
    Ok(())
}

fn save_plant_community(
    conn: &Connection,
    pasture_id: &str,
    community: &PlantCommunity,
) -> Result<(), StoreError> {
    let mut row = community.clone();
    let range_readiness = std::mem::take(&mut row.range_readiness);
    let stubble_height = std::mem::take(&mut row.stubble_height);
    let monitoring_areas = std::mem::take(&mut row.monitoring_areas);
    let pasture_actions = std::mem::take(&mut row.pasture_actions);

    conn.execute(
        "INSERT OR REPLACE INTO plant_communities (local_id, remote_id, pasture_id, data)
         VALUES (?1, ?2, ?3, ?4)",
        params![row.local_id, row.remote_id, pasture_id, serde_json::to_string(&row)?],
    )?;

    for plant in range_readiness.iter().chain(stubble_height.iter()) {
        conn.execute(
            "INSERT OR REPLACE INTO indicator_plants (local_id, plant_community_id, data)
             VALUES (?1, ?2, ?3)",
            params![plant.local_id, row.local_id, serde_json::to_string(plant)?],
        )?;
    }
    for area in &monitoring_areas {
        conn.execute(
            "INSERT OR REPLACE INTO monitoring_areas (local_id, plant_community_id, data)
             VALUES (?1, ?2, ?3)",
            params![area.local_id, row.local_id, serde_json::to_string(area)?],
        )?;
    }
    for action in &pasture_actions {
        conn.execute(
            "INSERT OR REPLACE INTO pasture_actions (local_id, plant_community_id, data)
             VALUES (?1, ?2, ?3)",
            params![action.local_id, row.local_id, serde_json::to_string(action)?],
        )?;
    }
    Ok(())
}

fn save_schedule(conn: &Connection, plan_id: &str, schedule: &Schedule) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO schedules (local_id, remote_id, plan_id, data)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            schedule.local_id,
            schedule.remote_id,
            plan_id,
            serde_json::to_string(schedule)?
        ],
    )?;
    Ok(())
}

fn save_issue(conn: &Connection, plan_id: &str, issue: &MinisterIssue) -> Result<(), StoreError> {
    let mut row = issue.clone();
    let actions = std::mem::take(&mut row.actions);

    conn.execute(
        "INSERT OR REPLACE INTO minister_issues (local_id, remote_id, plan_id, data)
         VALUES (?1, ?2, ?3, ?4)",
        params![row.local_id, row.remote_id, plan_id, serde_json::to_string(&row)?],
    )?;

    for action in &actions {
        conn.execute(
            "INSERT OR REPLACE INTO minister_issue_actions (local_id, issue_id, data)
             VALUES (?1, ?2, ?3)",
            params![action.local_id, row.local_id, serde_json::to_string(action)?],
        )?;
    }
    Ok(())
}

// --- Loading ---

fn rows_data(conn: &Connection, sql: &str, key: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map([key], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(crate) fn get_plan(conn: &Connection, local_id: &str) -> Result<Option<Plan>, StoreError> {
    let raw: Option<String> = conn
        .query_row("SELECT data FROM plans WHERE local_id = ?1", [local_id], |row| {
            row.get(0)
        })
        .optional()?;
    match raw {
        Some(raw) => {
            let mut plan: Plan = serde_json::from_str(&raw)?;
            load_plan_children(conn, &mut plan)?;
            Ok(Some(plan))
        }
        None => Ok(None),
    }
}

pub(crate) fn plan_by_remote_id(
    conn: &Connection,
    remote_id: i64,
) -> Result<Option<Plan>, StoreError> {
    let local_id: Option<String> = conn
        .query_row(
            "SELECT local_id FROM plans WHERE remote_id = ?1",
            [remote_id],
            |row| row.get(0),
        )
        .optional()?;
    match local_id {
        Some(local_id) => get_plan(conn, &local_id),
        None => Ok(None),
    }
}

fn load_plan_children(conn: &Connection, plan: &mut Plan) -> Result<(), StoreError> {
    for raw in rows_data(
        conn,
        "SELECT data FROM pastures WHERE plan_id = ?1 ORDER BY rowid",
        &plan.local_id,
    )? {
        let mut pasture: Pasture = serde_json::from_str(&raw)?;
        load_pasture_children(conn, &mut pasture)?;
        plan.pastures.push(pasture);
    }
    for raw in rows_data(
        conn,
        "SELECT data FROM schedules WHERE plan_id = ?1 ORDER BY rowid",
        &plan.local_id,
    )? {
        plan.schedules.push(serde_json::from_str(&raw)?);
    }
    for raw in rows_data(
        conn,
        "SELECT data FROM minister_issues WHERE plan_id = ?1 ORDER BY rowid",
        &plan.local_id,
    )? {
        let mut issue: MinisterIssue = serde_json::from_str(&raw)?;
        for action_raw in rows_data(
            conn,
            "SELECT data FROM minister_issue_actions WHERE issue_id = ?1 ORDER BY rowid",
            &issue.local_id,
        )? {
            issue.actions.push(serde_json::from_str(&action_raw)?);
        }
        plan.minister_issues.push(issue);
    }
    Ok(())
}

fn load_pasture_children(conn: &Connection, pasture: &mut Pasture) -> Result<(), StoreError> {
    for raw in rows_data(
        conn,
        "SELECT data FROM plant_communities WHERE pasture_id = ?1 ORDER BY rowid",
        &pasture.local_id,
    )? {
        let mut community: PlantCommunity = serde_json::from_str(&raw)?;
        for plant_raw in rows_data(
            conn,
            "SELECT data FROM indicator_plants WHERE plant_community_id = ?1 ORDER BY rowid",
            &community.local_id,
        )? {
            let plant: crate::model::pasture::IndicatorPlant = serde_json::from_str(&plant_raw)?;
            if plant.criteria.eq_ignore_ascii_case("stubbleheight") {
                community.stubble_height.push(plant);
            } else {
                community.range_readiness.push(plant);
            }
        }
        for area_raw in rows_data(
            conn,
            "SELECT data FROM monitoring_areas WHERE plant_community_id = ?1 ORDER BY rowid",
            &community.local_id,
        )? {
            community.monitoring_areas.push(serde_json::from_str(&area_raw)?);
        }
        for action_raw in rows_data(
            conn,
            "SELECT data FROM pasture_actions WHERE plant_community_id = ?1 ORDER BY rowid",
            &community.local_id,
        )? {
            community.pasture_actions.push(serde_json::from_str(&action_raw)?);
        }
        pasture.plant_communities.push(community);
    }
    Ok(())
}

pub(crate) fn plans_for_agreement(
    conn: &Connection,
    agreement_id: &str,
) -> Result<Vec<Plan>, StoreError> {
    let ids = rows_data(
        conn,
        "SELECT local_id FROM plans WHERE agreement_id = ?1 ORDER BY rowid",
        agreement_id,
    )?;
    let mut plans = Vec::new();
    for id in ids {
        if let Some(plan) = get_plan(conn, &id)? {
            plans.push(plan);
        }
    }
    Ok(plans)
}

pub(crate) fn outbox_plans(conn: &Connection) -> Result<Vec<Plan>, StoreError> {
    let mut stmt =
        conn.prepare_cached("SELECT local_id FROM plans WHERE remote_id IS NULL ORDER BY rowid")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    let mut plans = Vec::new();
    for id in ids {
        if let Some(plan) = get_plan(conn, &id)? {
            plans.push(plan);
        }
    }
    Ok(plans)
}

pub(crate) fn submitted_plans(conn: &Connection) -> Result<Vec<Plan>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT local_id FROM plans
         WHERE remote_id IS NOT NULL AND status NOT IN ('LocalDraft', 'Unknown')
         ORDER BY rowid",
    )?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    let mut plans = Vec::new();
    for id in ids {
        if let Some(plan) = get_plan(conn, &id)? {
            plans.push(plan);
        }
    }
    Ok(plans)
}

// --- Field updates ---

/// Update an entity's remote id, in both the indexed column and the row's
/// embedded JSON so a reload sees the same value.
pub(crate) fn set_remote_id(
    conn: &Connection,
    table: &str,
    local_id: &str,
    remote_id: i64,
) -> Result<(), StoreError> {
    let raw: Option<String> = conn
        .query_row(
            &format!("SELECT data FROM {} WHERE local_id = ?1", table),
            [local_id],
            |row| row.get(0),
        )
        .optional()?;
    let raw = raw.ok_or_else(|| StoreError::NotFound {
        entity: "row",
        id: local_id.to_string(),
    })?;

    let mut value: Value = serde_json::from_str(&raw)?;
    value["remote_id"] = Value::from(remote_id);

    conn.execute(
        &format!("UPDATE {} SET remote_id = ?1, data = ?2 WHERE local_id = ?3", table),
        params![remote_id, value.to_string(), local_id],
    )?;
    Ok(())
}

pub(crate) fn set_plan_status(
    conn: &Connection,
    local_id: &str,
    status: PlanStatus,
) -> Result<(), StoreError> {
    let raw: Option<String> = conn
        .query_row("SELECT data FROM plans WHERE local_id = ?1", [local_id], |row| {
            row.get(0)
        })
        .optional()?;
    let raw = raw.ok_or_else(|| StoreError::NotFound {
        entity: "plan",
        id: local_id.to_string(),
    })?;

    let mut value: Value = serde_json::from_str(&raw)?;
    value["status"] = Value::from(status.as_str());

    conn.execute(
        "UPDATE plans SET status = ?1, data = ?2 WHERE local_id = ?3",
        params![status.as_str(), value.to_string(), local_id],
    )?;
    Ok(())
}

// --- Cascade deletes ---

pub(crate) fn delete_plan(conn: &Connection, local_id: &str) -> Result<(), StoreError> {
    delete_plan_children(conn, local_id)?;
    conn.execute("DELETE FROM plans WHERE local_id = ?1", [local_id])?;
    Ok(())
}

fn delete_plan_children(conn: &Connection, plan_id: &str) -> Result<(), StoreError> {
    let pasture_ids = rows_data(
        conn,
        "SELECT local_id FROM pastures WHERE plan_id = ?1",
        plan_id,
    )?;
    for pasture_id in pasture_ids {
        delete_pasture(conn, &pasture_id)?;
    }

    conn.execute("DELETE FROM schedules WHERE plan_id = ?1", [plan_id])?;

    let issue_ids = rows_data(
        conn,
        "SELECT local_id FROM minister_issues WHERE plan_id = ?1",
        plan_id,
    )?;
    for issue_id in issue_ids {
        conn.execute(
            "DELETE FROM minister_issue_actions WHERE issue_id = ?1",
            [issue_id.as_str()],
        )?;
    }
    conn.execute("DELETE FROM minister_issues WHERE plan_id = ?1", [plan_id])?;
    Ok(())
}

pub(crate) fn delete_pasture(conn: &Connection, local_id: &str) -> Result<(), StoreError> {
    let community_ids = rows_data(
        conn,
        "SELECT local_id FROM plant_communities WHERE pasture_id = ?1",
        local_id,
    )?;
    for community_id in community_ids {
        delete_plant_community(conn, &community_id)?;
    }
    conn.execute("DELETE FROM pastures WHERE local_id = ?1", [local_id])?;
    Ok(())
}

pub(crate) fn delete_plant_community(conn: &Connection, local_id: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM indicator_plants WHERE plant_community_id = ?1",
        [local_id],
    )?;
    conn.execute(
        "DELETE FROM monitoring_areas WHERE plant_community_id = ?1",
        [local_id],
    )?;
    conn.execute(
        "DELETE FROM pasture_actions WHERE plant_community_id = ?1",
        [local_id],
    )?;
    conn.execute("DELETE FROM plant_communities WHERE local_id = ?1", [local_id])?;
    Ok(())
}
