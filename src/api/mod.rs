//! Typed client for the CRM REST backend.
//!
//! One thin method per endpoint; no retries, no backoff. Failures map
//! onto the [`ApiError`] taxonomy at this boundary so screens only ever
//! see normalized errors.

use crate::errors::{ApiError, ApiResult};
use crate::models::{
    Agent, ClosedByAgentEntry, Comment, Lead, LeadPayload, LeadSource, LeadStatus, NewAgent,
    NewComment, PipelineReport, Priority,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Lead-list filter state: each key holds at most one selected value,
/// and unset keys are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilters {
    pub status: Option<LeadStatus>,
    pub sales_agent: Option<String>,
    pub priority: Option<Priority>,
    pub source: Option<LeadSource>,
    pub tags: Option<String>,
}

impl LeadFilters {
    /// True when no filter is selected.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.sales_agent.is_none()
            && self.priority.is_none()
            && self.source.is_none()
            && self.tags.is_none()
    }

    /// Reset every key to unselected.
    pub fn clear(&mut self) {
        *self = LeadFilters::default();
    }

    /// Query parameters for `GET /leads`. Unset keys do not appear.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(ref agent) = self.sales_agent {
            params.push(("salesAgent", agent.clone()));
        }
        if let Some(priority) = self.priority {
            params.push(("priority", priority.to_string()));
        }
        if let Some(source) = self.source {
            params.push(("source", source.to_string()));
        }
        if let Some(ref tags) = self.tags {
            params.push(("tags", tags.clone()));
        }
        params
    }
}

/// HTTP client for the CRM backend.
pub struct CrmClient {
    base_url: String,
    timeout_seconds: u64,
    http: reqwest::Client,
}

impl CrmClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            http,
        }
    }

    /// Backend base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- Leads ---

    pub async fn list_leads(&self, filters: &LeadFilters) -> ApiResult<Vec<Lead>> {
        let url = format!("{}/leads", self.base_url);
        if filters.is_empty() {
            debug!("GET {} (unfiltered)", url);
        } else {
            debug!("GET {} with {} filter(s)", url, filters.to_query().len());
        }

        let response = self
            .http
            .get(&url)
            .query(&filters.to_query())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.decode(self.check(response, None).await?).await
    }

    pub async fn get_lead(&self, id: &str) -> ApiResult<Lead> {
        let url = format!("{}/leads/{}", self.base_url, id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let resource = format!("Lead {}", id);
        self.decode(self.check(response, Some(resource)).await?).await
    }

    pub async fn create_lead(&self, payload: &LeadPayload) -> ApiResult<Lead> {
        self.post_json(&format!("{}/leads", self.base_url), payload).await
    }

    pub async fn update_lead(&self, id: &str, payload: &LeadPayload) -> ApiResult<Lead> {
        let url = format!("{}/leads/{}", self.base_url, id);
        debug!("PATCH {}", url);

        let response = self
            .http
            .patch(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let resource = format!("Lead {}", id);
        self.decode(self.check(response, Some(resource)).await?).await
    }

    pub async fn delete_lead(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("{}/leads/{}", self.base_url, id), format!("Lead {}", id))
            .await
    }

    // --- Agents ---

    pub async fn list_agents(&self) -> ApiResult<Vec<Agent>> {
        self.get_json(&format!("{}/agents", self.base_url)).await
    }

    pub async fn create_agent(&self, payload: &NewAgent) -> ApiResult<Agent> {
        self.post_json(&format!("{}/agents", self.base_url), payload).await
    }

    pub async fn delete_agent(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("{}/agents/{}", self.base_url, id), format!("Agent {}", id))
            .await
    }

    // --- Comments ---

    pub async fn list_comments(&self, lead_id: &str) -> ApiResult<Vec<Comment>> {
        self.get_json(&format!("{}/leads/{}/comments", self.base_url, lead_id))
            .await
    }

    pub async fn create_comment(&self, lead_id: &str, payload: &NewComment) -> ApiResult<Comment> {
        self.post_json(
            &format!("{}/leads/{}/comments", self.base_url, lead_id),
            payload,
        )
        .await
    }

    // --- Reports ---

    pub async fn pipeline_report(&self) -> ApiResult<PipelineReport> {
        self.get_json(&format!("{}/report/pipeline", self.base_url)).await
    }

    pub async fn closed_by_agent_report(&self) -> ApiResult<Vec<ClosedByAgentEntry>> {
        self.get_json(&format!("{}/report/closed-by-agent", self.base_url))
            .await
    }

    pub async fn last_week_report(&self) -> ApiResult<Vec<Lead>> {
        self.get_json(&format!("{}/report/last-week", self.base_url)).await
    }

    // --- Plumbing ---

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.decode(self.check(response, None).await?).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> ApiResult<T> {
        debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.decode(self.check(response, None).await?).await
    }

    async fn delete(&self, url: &str, resource: String) -> ApiResult<()> {
        debug!("DELETE {}", url);
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.check(response, Some(resource)).await?;
        Ok(())
    }

    /// Map a transport-level failure onto the Network variant.
    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Network(format!("Request timed out after {}s", self.timeout_seconds))
        } else if e.is_connect() {
            ApiError::Network(format!(
                "Cannot connect to CRM backend at {}. Is the API URL correct?",
                self.base_url
            ))
        } else {
            ApiError::Network(format!("Failed to send request: {}", e))
        }
    }

    /// Turn non-success responses into typed errors. When `not_found`
    /// names a resource, a 404 becomes [`ApiError::NotFound`].
    async fn check(
        &self,
        response: reqwest::Response,
        not_found: Option<String>,
    ) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(resource) = not_found {
                return Err(ApiError::NotFound { resource });
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: status.as_u16(),
            message: extract_server_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull the `{"error": ...}` message out of an error body, falling back
/// to the raw body, then to a generic message.
fn extract_server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
    }
    if body.trim().is_empty() {
        "operation failed".to_string()
    } else {
        body.trim().to_string()
    }
}
