//! Local database schema.
//!
//! Entity rows carry their scalar fields as a JSON `data` column plus the
//! key columns the sync engine queries on.

use rusqlite::Connection;

pub(crate) fn init(conn: &Connection) -> rusqlite::Result<()> {
    // WAL for concurrent read access while a sync writes
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS agreements (
            agreement_id TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS plans (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER,
            agreement_id TEXT NOT NULL,
            status TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plans_agreement ON plans(agreement_id);
        CREATE INDEX IF NOT EXISTS idx_plans_remote ON plans(remote_id);

        CREATE TABLE IF NOT EXISTS pastures (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER,
            plan_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_pastures_plan ON pastures(plan_id);

        CREATE TABLE IF NOT EXISTS plant_communities (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER,
            pasture_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plant_communities_pasture
            ON plant_communities(pasture_id);

        CREATE TABLE IF NOT EXISTS indicator_plants (
            local_id TEXT PRIMARY KEY,
            plant_community_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_indicator_plants_community
            ON indicator_plants(plant_community_id);

        CREATE TABLE IF NOT EXISTS monitoring_areas (
            local_id TEXT PRIMARY KEY,
            plant_community_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_monitoring_areas_community
            ON monitoring_areas(plant_community_id);

        CREATE TABLE IF NOT EXISTS pasture_actions (
            local_id TEXT PRIMARY KEY,
            plant_community_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_pasture_actions_community
            ON pasture_actions(plant_community_id);

        CREATE TABLE IF NOT EXISTS schedules (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER,
            plan_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_schedules_plan ON schedules(plan_id);

        CREATE TABLE IF NOT EXISTS minister_issues (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER,
            plan_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_minister_issues_plan ON minister_issues(plan_id);

        CREATE TABLE IF NOT EXISTS minister_issue_actions (
            local_id TEXT PRIMARY KEY,
            issue_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_minister_issue_actions_issue
            ON minister_issue_actions(issue_id);

        CREATE TABLE IF NOT EXISTS reference_rows (
            table_name TEXT NOT NULL,
            id INTEGER NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (table_name, id)
        );

        CREATE TABLE IF NOT EXISTS sync_date (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            data TEXT NOT NULL
        );",
    )
}
