//! LocalStore gateway — SQLite-backed persistence for the entity graph.
//!
//! Every mutation runs inside [`Store::with_write_tx`]; an error raised in
//! the closure rolls the transaction back, so partial writes never persist.
//! Read-only lookups may run directly on the connection.
//!
//! Cascade rules are owned here, not by callers: deleting an agreement
//! removes its plan (unless it is a local draft) and the plan's whole
//! sub-graph; deleting a plant community removes its indicator plants,
//! monitoring areas, and pasture actions.

pub(crate) mod agreements;
pub(crate) mod plans;
pub(crate) mod reference;
mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::model::plan::{Plan, PlanStatus};
use crate::model::reference::{PlanStatusRow, ReferenceBundle, ReferenceTable, SyncDate};
use crate::model::Agreement;

/// Local storage failures. Recoverable: callers decide whether a failed
/// write aborts the surrounding operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
}

/// Handle to the local embedded store. Single-writer: all access goes
/// through one connection behind a mutex.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Store, StoreError> {
        std::fs::create_dir_all(data_dir)?;
        let db_path = data_dir.join("rangesync.db");
        let conn = Connection::open(&db_path)?;
        schema::init(&conn)?;
        info!(path = %db_path.display(), "local store opened");
        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Store, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock means a writer panicked; the connection itself is
        // still usable and the transaction it held has rolled back.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` inside a write transaction. Commits on `Ok`, rolls back on
    /// `Err` — no partial writes persist.
    pub fn with_write_tx<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Run a read-only lookup outside any transaction.
    pub fn read<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.lock();
        f(&conn)
    }

    // --- Agreements ---

    pub fn insert_agreement(&self, agreement: &Agreement) -> Result<(), StoreError> {
        self.with_write_tx(|tx| agreements::insert_agreement(tx, agreement))
    }

    pub fn agreement(&self, agreement_id: &str) -> Result<Option<Agreement>, StoreError> {
        self.read(|conn| agreements::get_agreement(conn, agreement_id))
    }

    pub fn agreements(&self) -> Result<Vec<Agreement>, StoreError> {
        self.read(agreements::list_agreements)
    }

    /// Cascade-delete an agreement. Local draft plans survive by policy.
    pub fn delete_agreement(&self, agreement_id: &str) -> Result<(), StoreError> {
        self.with_write_tx(|tx| agreements::delete_agreement(tx, agreement_id))
    }

    // --- Plans ---

    pub fn save_plan(&self, plan: &Plan) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::save_plan(tx, plan))
    }

    pub fn plan(&self, local_id: &str) -> Result<Option<Plan>, StoreError> {
        self.read(|conn| plans::get_plan(conn, local_id))
    }

    pub fn plan_by_remote_id(&self, remote_id: i64) -> Result<Option<Plan>, StoreError> {
        self.read(|conn| plans::plan_by_remote_id(conn, remote_id))
    }

    /// Plans created locally and never uploaded.
    pub fn outbox_plans(&self) -> Result<Vec<Plan>, StoreError> {
        self.read(plans::outbox_plans)
    }

    /// Remotely-known plans whose status should be refreshed during sync.
    pub fn submitted_plans(&self) -> Result<Vec<Plan>, StoreError> {
        self.read(plans::submitted_plans)
    }

    pub fn delete_plan(&self, local_id: &str) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::delete_plan(tx, local_id))
    }

    pub fn delete_pasture(&self, local_id: &str) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::delete_pasture(tx, local_id))
    }

    pub fn delete_plant_community(&self, local_id: &str) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::delete_plant_community(tx, local_id))
    }

    pub fn set_plan_remote_id(&self, local_id: &str, remote_id: i64) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::set_remote_id(tx, "plans", local_id, remote_id))
    }

    pub fn set_plan_status(&self, local_id: &str, status: PlanStatus) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::set_plan_status(tx, local_id, status))
    }

    pub fn set_pasture_remote_id(&self, local_id: &str, remote_id: i64) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::set_remote_id(tx, "pastures", local_id, remote_id))
    }

    pub fn set_schedule_remote_id(&self, local_id: &str, remote_id: i64) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::set_remote_id(tx, "schedules", local_id, remote_id))
    }

    pub fn set_issue_remote_id(&self, local_id: &str, remote_id: i64) -> Result<(), StoreError> {
        self.with_write_tx(|tx| plans::set_remote_id(tx, "minister_issues", local_id, remote_id))
    }

    // --- Reference data ---

    /// Replace every reference table with the freshly downloaded rows, as a
    /// single atomic write.
    pub fn replace_reference(&self, bundle: &ReferenceBundle) -> Result<(), StoreError> {
        self.with_write_tx(|tx| reference::replace_reference(tx, bundle))
    }

    /// Typed rows of one reference table, ordered by id.
    pub fn reference_rows<T: DeserializeOwned>(
        &self,
        table: ReferenceTable,
    ) -> Result<Vec<T>, StoreError> {
        self.read(|conn| reference::rows(conn, table))
    }

    pub fn plan_status_row(&self, id: i64) -> Result<Option<PlanStatusRow>, StoreError> {
        self.read(|conn| reference::row_by_id(conn, ReferenceTable::PlanStatus, id))
    }

    // --- Sync date ---

    /// Record a completed sync. Any stale singleton is removed first; the
    /// reference-download timestamp is only set when that stage succeeded.
    pub fn record_sync(
        &self,
        now: DateTime<Utc>,
        downloaded_reference: bool,
    ) -> Result<(), StoreError> {
        let record = SyncDate {
            full_sync: now,
            ref_download: downloaded_reference.then_some(now),
        };
        self.with_write_tx(|tx| {
            tx.execute("DELETE FROM sync_date", [])?;
            tx.execute(
                "INSERT INTO sync_date (id, data) VALUES (0, ?1)",
                [serde_json::to_string(&record)?],
            )?;
            Ok(())
        })
    }

    pub fn last_sync(&self) -> Result<Option<SyncDate>, StoreError> {
        self.read(|conn| {
            let raw: Option<String> = conn
                .query_row("SELECT data FROM sync_date WHERE id = 0", [], |row| {
                    row.get(0)
                })
                .optional()?;
            match raw {
                Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
                None => Ok(None),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pasture::{IndicatorPlant, Pasture, PlantCommunity};
    use crate::model::plan::Plan;
    use crate::model::reference::LivestockType;

    fn draft_plan(agreement_id: &str) -> Plan {
        let mut plan = Plan::new(agreement_id);
        let mut pasture = Pasture::new();
        pasture.name = "North".to_string();
        let mut community = PlantCommunity::new();
        community.name = "Upper bench".to_string();
        community
            .range_readiness
            .push(IndicatorPlant::new("rangereadiness"));
        pasture.plant_communities.push(community);
        plan.pastures.push(pasture);
        plan
    }

    #[test]
    fn on_disk_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let plan = draft_plan("RAN1");
        {
            let store = Store::open(dir.path()).unwrap();
            store.save_plan(&plan).unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        let loaded = store.plan(&plan.local_id).unwrap().unwrap();
        assert_eq!(loaded, plan);
    }

    #[test]
    fn plan_roundtrip_preserves_the_graph() {
        let store = Store::open_in_memory().unwrap();
        let plan = draft_plan("RAN1");
        store.save_plan(&plan).unwrap();

        let loaded = store.plan(&plan.local_id).unwrap().unwrap();
        assert_eq!(loaded, plan);
    }

    #[test]
    fn failed_write_rolls_back() {
        let store = Store::open_in_memory().unwrap();
        let plan = draft_plan("RAN1");

        let result: Result<(), StoreError> = store.with_write_tx(|tx| {
            plans::save_plan(tx, &plan)?;
            Err(StoreError::NotFound {
                entity: "plan",
                id: "forced failure".to_string(),
            })
        });
        assert!(result.is_err());

        assert!(store.plan(&plan.local_id).unwrap().is_none());
    }

    #[test]
    fn plant_community_delete_cascades() {
        let store = Store::open_in_memory().unwrap();
        let plan = draft_plan("RAN1");
        store.save_plan(&plan).unwrap();

        let community_id = plan.pastures[0].plant_communities[0].local_id.clone();
        store.delete_plant_community(&community_id).unwrap();

        let count: i64 = store
            .read(|conn| {
                Ok(conn.query_row("SELECT count(*) FROM indicator_plants", [], |row| {
                    row.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(count, 0);

        let loaded = store.plan(&plan.local_id).unwrap().unwrap();
        assert!(loaded.pastures[0].plant_communities.is_empty());
    }

    #[test]
    fn remote_id_update_survives_reload() {
        let store = Store::open_in_memory().unwrap();
        let plan = draft_plan("RAN1");
        store.save_plan(&plan).unwrap();

        store.set_plan_remote_id(&plan.local_id, 77).unwrap();
        let loaded = store.plan(&plan.local_id).unwrap().unwrap();
        assert_eq!(loaded.remote_id, Some(77));

        assert!(store.plan_by_remote_id(77).unwrap().is_some());
        assert!(store.outbox_plans().unwrap().is_empty());
    }

    #[test]
    fn sync_date_is_a_singleton() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.last_sync().unwrap().is_none());

        let first = Utc::now();
        store.record_sync(first, true).unwrap();
        let second = first + chrono::Duration::seconds(90);
        store.record_sync(second, false).unwrap();

        let count: i64 = store
            .read(|conn| Ok(conn.query_row("SELECT count(*) FROM sync_date", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(count, 1);

        let last = store.last_sync().unwrap().unwrap();
        assert_eq!(last.full_sync, second);
        assert_eq!(last.ref_download, None);
    }

    #[test]
    fn reference_rows_come_back_ordered() {
        let store = Store::open_in_memory().unwrap();
        let bundle = ReferenceBundle {
            livestock_types: vec![
                LivestockType {
                    id: 2,
                    name: "Cattle".to_string(),
                    au_factor: 1.0,
                },
                LivestockType {
                    id: 1,
                    name: "Horse".to_string(),
                    au_factor: 1.25,
                },
            ],
            ..Default::default()
        };
        store.replace_reference(&bundle).unwrap();

        let rows: Vec<LivestockType> = store
            .reference_rows(ReferenceTable::LivestockType)
            .unwrap();
        assert_eq!(rows[0].name, "Horse");
        assert_eq!(rows[1].name, "Cattle");
    }
}
