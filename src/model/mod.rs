//! Typed domain model for agreements, plans, and reference data.
//!
//! Every locally-stored entity carries a generated `local_id` used as the
//! store's primary key; `remote_id` is the server's key and stays `None`
//! until the entity has been uploaded.

pub mod agreement;
pub mod pasture;
pub mod plan;
pub mod reference;
pub mod schedule;

pub use agreement::{Agreement, Client, District, RangeUsageYear, Zone};
pub use pasture::{
    IndicatorPlant, MonitoringArea, Pasture, PastureAction, PlantCommunity, PurposeOfAction,
};
pub use plan::{
    AdditionalRequirement, LivestockId, MinisterIssue, MinisterIssueAction, Plan, PlanStatus,
};
pub use reference::{
    AgreementExemptionStatus, AgreementStatus, AgreementType, ClientType, LivestockIdentifierType,
    LivestockType, MinisterIssueActionType, MinisterIssueType, PlanStatusRow, ReferenceBundle,
    ReferenceTable, SyncDate,
};
pub use schedule::{Schedule, ScheduleEntry};

/// Generate a fresh local identity for a new entity.
pub fn new_local_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
