//! The sync engine: orchestration, outbox upload, download merge, and the
//! background auto-sync listener.

pub mod listener;
pub mod merge;
pub mod orchestrator;
pub mod outbox;

pub use listener::AutoSync;
pub use merge::MergeReport;
pub use orchestrator::Synchronizer;

use crate::api::ApiError;
use crate::store::StoreError;

/// Why a sync run failed. Stage failures other than the agreement download
/// are reported through progress text and do not surface here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("not connected to internet")]
    NoConnectivity,

    #[error("server reported failure: {0}")]
    Remote(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<ApiError> for SyncError {
    fn from(error: ApiError) -> SyncError {
        match error {
            ApiError::Remote(message) => SyncError::Remote(message),
            ApiError::Network(message) | ApiError::InvalidResponse(message) => {
                SyncError::Transport(message)
            }
        }
    }
}
