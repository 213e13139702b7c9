//! Reference table persistence. Wholesale replace on download, typed reads.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreError;
use crate::model::reference::{ReferenceBundle, ReferenceTable};

pub(crate) fn replace_reference(
    conn: &Connection,
    bundle: &ReferenceBundle,
) -> Result<(), StoreError> {
    conn.execute("DELETE FROM reference_rows", [])?;

    insert_rows(conn, ReferenceTable::LivestockType, &bundle.livestock_types, |r| r.id)?;
    insert_rows(conn, ReferenceTable::AgreementType, &bundle.agreement_types, |r| r.id)?;
    insert_rows(
        conn,
        ReferenceTable::AgreementStatus,
        &bundle.agreement_statuses,
        |r| r.id,
    )?;
    insert_rows(
        conn,
        ReferenceTable::LivestockIdentifierType,
        &bundle.livestock_identifier_types,
        |r| r.id,
    )?;
    insert_rows(conn, ReferenceTable::ClientType, &bundle.client_types, |r| r.id)?;
    insert_rows(conn, ReferenceTable::PlanStatus, &bundle.plan_statuses, |r| r.id)?;
    insert_rows(
        conn,
        ReferenceTable::AgreementExemptionStatus,
        &bundle.agreement_exemption_statuses,
        |r| r.id,
    )?;
    insert_rows(
        conn,
        ReferenceTable::MinisterIssueType,
        &bundle.minister_issue_types,
        |r| r.id,
    )?;
    insert_rows(
        conn,
        ReferenceTable::MinisterIssueActionType,
        &bundle.minister_issue_action_types,
        |r| r.id,
    )?;
    Ok(())
}

fn insert_rows<T: Serialize>(
    conn: &Connection,
    table: ReferenceTable,
    rows: &[T],
    id_of: impl Fn(&T) -> i64,
) -> Result<(), StoreError> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO reference_rows (table_name, id, data) VALUES (?1, ?2, ?3)",
    )?;
    for row in rows {
        stmt.execute(params![table.as_str(), id_of(row), serde_json::to_string(row)?])?;
    }
    Ok(())
}

pub(crate) fn rows<T: DeserializeOwned>(
    conn: &Connection,
    table: ReferenceTable,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT data FROM reference_rows WHERE table_name = ?1 ORDER BY id",
    )?;
    let raws = stmt
        .query_map([table.as_str()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<String>, _>>()?;

    let mut out = Vec::with_capacity(raws.len());
    for raw in raws {
        out.push(serde_json::from_str(&raw)?);
    }
    Ok(out)
}

pub(crate) fn row_by_id<T: DeserializeOwned>(
    conn: &Connection,
    table: ReferenceTable,
    id: i64,
) -> Result<Option<T>, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT data FROM reference_rows WHERE table_name = ?1 AND id = ?2",
            params![table.as_str(), id],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}
