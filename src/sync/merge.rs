//! Reconcile downloaded agreements against the local cache.
//!
//! Policy: the download is authoritative for agreement shells and for plans
//! the server knows about, but a local draft plan always wins — its
//! agreement shell is refreshed and the downloaded plan is discarded.
//! Agreements present locally but absent from the download are left alone;
//! absence from one download is not evidence of deletion.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::model::plan::PlanStatus;
use crate::model::reference::{PlanStatusRow, ReferenceTable};
use crate::model::Agreement;
use crate::store::{agreements, plans, reference, Store, StoreError};

/// What one merge pass did, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub replaced: usize,
    pub drafts_preserved: usize,
}

/// Apply a downloaded agreement batch in a single transaction; a failure
/// rolls the whole batch back.
pub fn merge_agreements(
    store: &Store,
    downloaded: Vec<Agreement>,
) -> Result<MergeReport, StoreError> {
    let report = store.with_write_tx(|tx| {
        let mut report = MergeReport::default();

        for mut agreement in downloaded {
            // Downloaded plans arrive with a raw status id; resolve it
            // against the PLAN_STATUS reference table as the plan lands.
            if let Some(plan) = agreement.plan.as_mut() {
                plan.status = resolve_status(tx, plan.remote_status_id)?;
            }

            let exists: Option<String> = tx
                .query_row(
                    "SELECT agreement_id FROM agreements WHERE agreement_id = ?1",
                    [agreement.agreement_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            let local_plans = plans::plans_for_agreement(tx, &agreement.agreement_id)?;
            let has_draft = local_plans.iter().any(|p| p.status.is_local_draft());

            if has_draft {
                // The draft stays; only refresh the shell around it.
                debug!(
                    agreement_id = %agreement.agreement_id,
                    "local draft present, discarding downloaded plan"
                );
                agreement.plan = None;
                report.drafts_preserved += 1;
            }

            for plan in &local_plans {
                if !plan.status.is_local_draft() {
                    plans::delete_plan(tx, &plan.local_id)?;
                }
            }

            agreements::insert_agreement(tx, &agreement)?;
            if exists.is_some() {
                report.replaced += 1;
            } else {
                report.added += 1;
            }
        }

        Ok(report)
    })?;

    info!(
        added = report.added,
        replaced = report.replaced,
        drafts_preserved = report.drafts_preserved,
        "merged downloaded agreements"
    );
    Ok(report)
}

fn resolve_status(conn: &Connection, status_id: Option<i64>) -> Result<PlanStatus, StoreError> {
    let Some(status_id) = status_id else {
        return Ok(PlanStatus::Unknown);
    };
    let row: Option<PlanStatusRow> =
        reference::row_by_id(conn, ReferenceTable::PlanStatus, status_id)?;
    Ok(match row {
        Some(row) => PlanStatus::from_reference(&row.code, &row.name),
        None => PlanStatus::Unknown,
    })
}
