//! Remote service boundary.
//!
//! The orchestrator talks to the range service through the [`RemoteApi`]
//! trait so tests can drive sync without a server; [`client::HttpApi`] is the
//! production implementation.

pub mod client;

use async_trait::async_trait;
use serde_json::Value;

pub use client::{HttpApi, HttpConnectivity};

/// Remote API errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("server reported failure: {0}")]
    Remote(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Supplies the bearer credential for authenticated requests. `None` means
/// no session; requests fall back to a plain content-type header.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// The slice of the range service the sync core relies on.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// GET the reference payload: one object keyed by table name.
    async fn get_reference_data(&self) -> Result<Value, ApiError>;

    /// GET the full agreement list.
    async fn get_agreements(&self) -> Result<Value, ApiError>;

    /// GET a plan by its remote id, used to refresh statuses.
    async fn get_plan(&self, remote_id: i64) -> Result<Value, ApiError>;

    /// POST a new plan; the response body carries the assigned remote id.
    async fn add_plan(&self, params: Value) -> Result<Value, ApiError>;

    /// POST a pasture onto a remotely-known plan.
    async fn add_pasture(&self, plan_id: i64, params: Value) -> Result<Value, ApiError>;

    /// POST a minister issue onto a remotely-known plan.
    async fn add_issue(&self, plan_id: i64, params: Value) -> Result<Value, ApiError>;

    /// POST an action onto a remotely-known minister issue.
    async fn add_issue_action(
        &self,
        plan_id: i64,
        issue_id: i64,
        params: Value,
    ) -> Result<Value, ApiError>;

    /// POST a grazing schedule onto a remotely-known plan.
    async fn add_schedule(&self, plan_id: i64, params: Value) -> Result<Value, ApiError>;
}

/// Network reachability probe run before a sync begins.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_reachable(&self) -> bool;
}
