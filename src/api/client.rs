//! HTTP implementation of the remote service boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::{ApiError, Connectivity, RemoteApi, TokenProvider};
use crate::config::ApiConfig;

/// reqwest-backed client for the range service.
pub struct HttpApi {
    client: reqwest::Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpApi {
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenProvider>) -> HttpApi {
        HttpApi {
            client: reqwest::Client::new(),
            config,
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .timeout(Duration::from_secs(self.config.request_timeout_secs));

        match self.tokens.token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder.header(CONTENT_TYPE, "application/json"),
        }
    }

    async fn get_json(&self, url: String) -> Result<Value, ApiError> {
        debug!(%url, "GET");
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Remote(format!("HTTP {}", response.status())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        check_remote_error(&body)?;
        Ok(body)
    }

    async fn post_json(&self, url: String, params: Value) -> Result<Value, ApiError> {
        debug!(%url, "POST");
        let response = self
            .request(Method::POST, url)
            .json(&params)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Remote(format!("HTTP {}", response.status())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        check_remote_error(&body)?;
        Ok(body)
    }
}

/// Structured failures arrive with HTTP 200: either `success: false` plus an
/// `error` message, or a bare top-level `error` string.
fn check_remote_error(body: &Value) -> Result<(), ApiError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("no error provided");
        return Err(ApiError::Remote(message.to_string()));
    }
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(ApiError::Remote(message.to_string()));
    }
    Ok(())
}

fn with_plan_id(path: &str, plan_id: i64) -> String {
    path.replace(":id", &plan_id.to_string())
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn get_reference_data(&self) -> Result<Value, ApiError> {
        self.get_json(self.url(&self.config.reference_path)).await
    }

    async fn get_agreements(&self) -> Result<Value, ApiError> {
        self.get_json(self.url(&self.config.agreement_path)).await
    }

    async fn get_plan(&self, remote_id: i64) -> Result<Value, ApiError> {
        let path = format!("{}{}", self.config.plan_path, remote_id);
        self.get_json(self.url(&path)).await
    }

    async fn add_plan(&self, params: Value) -> Result<Value, ApiError> {
        self.post_json(self.url(&self.config.plan_path), params).await
    }

    async fn add_pasture(&self, plan_id: i64, params: Value) -> Result<Value, ApiError> {
        let path = with_plan_id(&self.config.pasture_path, plan_id);
        self.post_json(self.url(&path), params).await
    }

    async fn add_issue(&self, plan_id: i64, params: Value) -> Result<Value, ApiError> {
        let path = with_plan_id(&self.config.issue_path, plan_id);
        self.post_json(self.url(&path), params).await
    }

    async fn add_issue_action(
        &self,
        plan_id: i64,
        issue_id: i64,
        params: Value,
    ) -> Result<Value, ApiError> {
        let path = self
            .config
            .action_path
            .replace(":planId?", &plan_id.to_string())
            .replace(":issueId?", &issue_id.to_string());
        self.post_json(self.url(&path), params).await
    }

    async fn add_schedule(&self, plan_id: i64, params: Value) -> Result<Value, ApiError> {
        let path = with_plan_id(&self.config.schedule_path, plan_id);
        self.post_json(self.url(&path), params).await
    }
}

/// Reachability probe that HEADs the API base URL. Any response counts as
/// reachable; only a transport failure does not.
pub struct HttpConnectivity {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpConnectivity {
    pub fn new(base_url: &str) -> HttpConnectivity {
        HttpConnectivity {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[async_trait]
impl Connectivity for HttpConnectivity {
    async fn is_reachable(&self) -> bool {
        self.client
            .head(&self.base_url)
            .timeout(self.timeout)
            .send()
            .await
            .is_ok()
    }
}
