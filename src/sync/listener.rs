//! Background auto-sync listener.
//!
//! A periodic tick that fires a sync trigger while enabled and not
//! suspended. The orchestrator suspends the listener for the duration of a
//! manual sync so a tick cannot start a second run mid-flight.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

pub struct AutoSync {
    enabled: AtomicBool,
    suspended: AtomicBool,
    shutdown: Notify,
}

impl AutoSync {
    pub fn new(enabled: bool) -> AutoSync {
        AutoSync {
            enabled: AtomicBool::new(enabled),
            suspended: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Hold ticks while a sync is already running.
    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.suspended.store(false, Ordering::SeqCst);
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    fn should_fire(&self) -> bool {
        self.enabled.load(Ordering::SeqCst) && !self.suspended.load(Ordering::SeqCst)
    }

    /// Start the tick loop. Each eligible tick awaits `trigger` to
    /// completion before the next tick is considered.
    pub fn begin<F, Fut>(self: &Arc<Self>, interval: Duration, trigger: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let listener = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval fires immediately; swallow the first tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if listener.should_fire() {
                            trigger().await;
                        }
                    }
                    _ = listener.shutdown.notified() => {
                        debug!("auto-sync listener stopped");
                        break;
                    }
                }
            }
        })
    }
}
