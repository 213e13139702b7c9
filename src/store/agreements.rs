//! Agreement persistence.
//!
//! An agreement row holds the agreement shell; its plan is stored through
//! the plans module and re-attached on load. An agreement stored with
//! `plan: None` leaves any existing local plans alone.

use rusqlite::{params, Connection, OptionalExtension};

use super::{plans, StoreError};
use crate::model::Agreement;

pub(crate) fn insert_agreement(conn: &Connection, agreement: &Agreement) -> Result<(), StoreError> {
    let mut shell = agreement.clone();
    let plan = shell.plan.take();

    conn.execute(
        "INSERT OR REPLACE INTO agreements (agreement_id, data) VALUES (?1, ?2)",
        params![shell.agreement_id, serde_json::to_string(&shell)?],
    )?;

    if let Some(plan) = plan {
        plans::save_plan(conn, &plan)?;
    }
    Ok(())
}

pub(crate) fn get_agreement(
    conn: &Connection,
    agreement_id: &str,
) -> Result<Option<Agreement>, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT data FROM agreements WHERE agreement_id = ?1",
            [agreement_id],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        Some(raw) => {
            let mut agreement: Agreement = serde_json::from_str(&raw)?;
            attach_plan(conn, &mut agreement)?;
            Ok(Some(agreement))
        }
        None => Ok(None),
    }
}

pub(crate) fn list_agreements(conn: &Connection) -> Result<Vec<Agreement>, StoreError> {
    let mut stmt =
        conn.prepare_cached("SELECT data FROM agreements ORDER BY agreement_id")?;
    let raws = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<String>, _>>()?;

    let mut agreements = Vec::with_capacity(raws.len());
    for raw in raws {
        let mut agreement: Agreement = serde_json::from_str(&raw)?;
        attach_plan(conn, &mut agreement)?;
        agreements.push(agreement);
    }
    Ok(agreements)
}

/// Local draft plans take precedence over whatever the download attached.
fn attach_plan(conn: &Connection, agreement: &mut Agreement) -> Result<(), StoreError> {
    let plans = plans::plans_for_agreement(conn, &agreement.agreement_id)?;
    agreement.plan = plans
        .iter()
        .find(|p| p.status.is_local_draft())
        .or_else(|| plans.first())
        .cloned();
    Ok(())
}

pub(crate) fn delete_agreement(conn: &Connection, agreement_id: &str) -> Result<(), StoreError> {
    for plan in plans::plans_for_agreement(conn, agreement_id)? {
        if plan.status.is_local_draft() {
            continue;
        }
        plans::delete_plan(conn, &plan.local_id)?;
    }
    conn.execute(
        "DELETE FROM agreements WHERE agreement_id = ?1",
        [agreement_id],
    )?;
    Ok(())
}
