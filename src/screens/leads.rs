//! Lead list screen state: filtered fetch plus optimistic list splices
//! after writes.

use crate::api::{CrmClient, LeadFilters};
use crate::errors::ApiResult;
use crate::models::{Agent, Lead, LeadPayload, LeadSource, LeadStatus, Priority};
use crate::screens::{fetch_spinner, validate_lead_payload};
use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Default, Serialize)]
pub struct LeadListScreen {
    #[serde(skip)]
    pub filters: LeadFilters,
    pub leads: Vec<Lead>,
    pub agents: Vec<Agent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LeadListScreen {
    pub fn new(filters: LeadFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Fetch the filtered lead list and the agent roster together. The
    /// agents back the filter display and the assigned-agent column.
    pub async fn load(&mut self, client: &CrmClient) -> ApiResult<()> {
        let spinner = fetch_spinner("Loading leads...");
        let result = tokio::try_join!(client.list_leads(&self.filters), client.list_agents());
        spinner.finish_and_clear();

        match result {
            Ok((leads, agents)) => {
                self.leads = leads;
                self.agents = agents;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching leads: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate, create on the backend, then append to local state.
    pub async fn create(&mut self, client: &CrmClient, payload: &LeadPayload) -> Result<Lead> {
        validate_lead_payload(payload).map_err(|msg| anyhow!(msg))?;
        let lead = client.create_lead(payload).await?;
        info!("Created lead {} ({})", lead.name, lead.id);
        self.apply_created(lead.clone());
        Ok(lead)
    }

    /// Validate, replace on the backend, then splice into local state.
    pub async fn update(
        &mut self,
        client: &CrmClient,
        id: &str,
        payload: &LeadPayload,
    ) -> Result<Lead> {
        validate_lead_payload(payload).map_err(|msg| anyhow!(msg))?;
        let lead = client.update_lead(id, payload).await?;
        info!("Updated lead {} ({})", lead.name, lead.id);
        self.apply_updated(lead.clone());
        Ok(lead)
    }

    /// Delete on the backend, then drop from local state.
    pub async fn delete(&mut self, client: &CrmClient, id: &str) -> Result<()> {
        client.delete_lead(id).await?;
        info!("Deleted lead {}", id);
        self.apply_deleted(id);
        Ok(())
    }

    /// Optimistic splice: append a newly created lead.
    pub fn apply_created(&mut self, lead: Lead) {
        self.leads.push(lead);
    }

    /// Optimistic splice: replace the lead with the same id, if loaded.
    pub fn apply_updated(&mut self, lead: Lead) {
        if let Some(slot) = self.leads.iter_mut().find(|l| l.id == lead.id) {
            *slot = lead;
        }
    }

    /// Optimistic splice: remove the lead with this id, if loaded.
    pub fn apply_deleted(&mut self, id: &str) {
        self.leads.retain(|l| l.id != id);
    }
}

/// Build the full replacement payload for an update from the current
/// record plus whatever fields the caller changed. Updates are
/// full-record replaces, never partial patches.
#[allow(clippy::too_many_arguments)]
pub fn merge_lead_update(
    current: &Lead,
    name: Option<String>,
    source: Option<LeadSource>,
    agent: Option<String>,
    status: Option<LeadStatus>,
    priority: Option<Priority>,
    tags: Option<Vec<String>>,
    time_to_close: Option<u32>,
) -> LeadPayload {
    // "none" unassigns; any other value reassigns; absent keeps current.
    let sales_agent = match agent {
        Some(ref value) if value.eq_ignore_ascii_case("none") => None,
        Some(value) => Some(value),
        None => current.agent_id().map(str::to_string),
    };

    LeadPayload {
        name: name.unwrap_or_else(|| current.name.clone()),
        source: source.unwrap_or(current.source),
        sales_agent,
        status: status.unwrap_or(current.status),
        tags: tags.unwrap_or_else(|| current.tags.clone()),
        time_to_close: time_to_close.or(current.time_to_close),
        priority: priority.unwrap_or(current.priority),
    }
}
