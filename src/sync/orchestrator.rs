//! The sync run itself.
//!
//! A run verifies connectivity, suspends the auto-sync listener, then drives
//! four stages concurrently: outbox upload, reference download, agreement
//! download, and plan status refresh. Only the agreement download can fail
//! the run; the other stages report through progress text and logs. The
//! merge and the sync-date write happen after all stages settle, and the
//! listener is resumed no matter how the run ended.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::listener::AutoSync;
use super::{merge, outbox, SyncError};
use crate::api::{Connectivity, RemoteApi};
use crate::config::AutoSyncConfig;
use crate::decode::{decode_agreements, decode_reference};
use crate::model::plan::PlanStatus;
use crate::model::Agreement;
use crate::store::Store;

/// Progress callback. Receives short human-readable stage descriptions.
pub type Progress<'a> = &'a (dyn Fn(&str) + Send + Sync);

pub struct Synchronizer {
    store: Arc<Store>,
    api: Arc<dyn RemoteApi>,
    connectivity: Arc<dyn Connectivity>,
    listener: Arc<AutoSync>,
    auto_sync_interval: Duration,
}

impl Synchronizer {
    pub fn new(
        store: Arc<Store>,
        api: Arc<dyn RemoteApi>,
        connectivity: Arc<dyn Connectivity>,
        auto_sync: &AutoSyncConfig,
    ) -> Synchronizer {
        Synchronizer {
            store,
            api,
            connectivity,
            listener: Arc::new(AutoSync::new(auto_sync.enabled)),
            auto_sync_interval: Duration::from_secs(auto_sync.interval_secs),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Run one full sync. The listener is suspended for the duration so a
    /// background tick cannot start a concurrent run.
    pub async fn sync(&self, progress: Progress<'_>) -> Result<(), SyncError> {
        if !self.connectivity.is_reachable().await {
            progress("Failed while verifying connection");
            return Err(SyncError::NoConnectivity);
        }

        self.listener.suspend();
        let result = self.run_stages(progress).await;
        self.listener.resume();

        if let Err(error) = &result {
            progress(&format!("Sync Failed. {}", error));
        }
        result
    }

    async fn run_stages(&self, progress: Progress<'_>) -> Result<(), SyncError> {
        let (outbox_result, reference_result, agreements_result, status_result) = tokio::join!(
            self.upload_stage(progress),
            self.reference_stage(progress),
            self.agreements_stage(progress),
            self.status_stage(progress),
        );

        if let Err(error) = outbox_result {
            warn!(error = %error, "outbox upload failed");
        }
        let reference_ok = match reference_result {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, "reference download failed");
                progress("Failed while downloading reference data");
                false
            }
        };
        if let Err(error) = status_result {
            warn!(error = %error, "plan status refresh failed");
        }

        // The agreement download is the one stage that decides the run.
        let agreements = agreements_result?;

        progress("Updating stored data");
        merge::merge_agreements(&self.store, agreements)?;
        self.store.record_sync(Utc::now(), reference_ok)?;
        info!("sync completed");
        Ok(())
    }

    async fn upload_stage(&self, progress: Progress<'_>) -> Result<usize, SyncError> {
        progress("Uploading data to the server");
        outbox::upload_outbox(&self.store, self.api.as_ref()).await
    }

    async fn reference_stage(&self, progress: Progress<'_>) -> Result<(), SyncError> {
        progress("Downloading reference data");
        let payload = self.api.get_reference_data().await?;
        let bundle = decode_reference(&payload);
        self.store.replace_reference(&bundle)?;
        Ok(())
    }

    async fn agreements_stage(&self, progress: Progress<'_>) -> Result<Vec<Agreement>, SyncError> {
        progress("Downloading agreements");
        let payload = self.api.get_agreements().await?;
        let (agreements, anomalies) = decode_agreements(&payload);
        if !anomalies.is_empty() {
            warn!(skipped = anomalies.len(), "agreements skipped during decode");
        }
        Ok(agreements)
    }

    /// Refresh the workflow status of every remotely-known plan. A failure
    /// for one plan skips that plan only.
    async fn status_stage(&self, progress: Progress<'_>) -> Result<(), SyncError> {
        progress("Updating plan statuses");

        for plan in self.store.submitted_plans()? {
            let Some(remote_id) = plan.remote_id else { continue };

            let payload = match self.api.get_plan(remote_id).await {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(remote_id, error = %error, "plan status fetch failed");
                    continue;
                }
            };
            let Some(status_id) = payload["statusId"].as_i64() else {
                warn!(remote_id, "plan payload has no statusId");
                continue;
            };

            let status = match self.store.plan_status_row(status_id)? {
                Some(row) => PlanStatus::from_reference(&row.code, &row.name),
                None => PlanStatus::Unknown,
            };
            if status != plan.status {
                self.store.set_plan_status(&plan.local_id, status)?;
                info!(remote_id, status = status.as_str(), "plan status updated");
            }
        }
        Ok(())
    }

    // --- Auto-sync ---

    /// Start the background listener. Ticks run a full sync with no progress
    /// reporting; failures are logged and the listener keeps ticking.
    pub fn start_auto_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        self.listener.begin(self.auto_sync_interval, move || {
            let weak = weak.clone();
            async move {
                if let Some(synchronizer) = weak.upgrade() {
                    if let Err(error) = synchronizer.sync(&|_| {}).await {
                        warn!(error = %error, "auto sync failed");
                    }
                }
            }
        })
    }

    pub fn set_auto_sync_enabled(&self, enabled: bool) {
        self.listener.set_enabled(enabled);
    }

    pub fn stop_auto_sync(&self) {
        self.listener.shutdown();
    }
}
