//! Agent management screen state.

use crate::api::{CrmClient, LeadFilters};
use crate::errors::ApiResult;
use crate::metrics::agent_lead_stats;
use crate::models::{Agent, Lead, NewAgent};
use crate::screens::{fetch_spinner, validate_new_agent};
use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Default, Serialize)]
pub struct AgentsScreen {
    pub agents: Vec<Agent>,
    pub leads: Vec<Lead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the agent roster and the full lead list together; the
    /// leads back the per-agent stat pair on each card.
    pub async fn load(&mut self, client: &CrmClient) -> ApiResult<()> {
        let spinner = fetch_spinner("Loading agents...");
        let filters = LeadFilters::default();
        let result = tokio::try_join!(
            client.list_agents(),
            client.list_leads(&filters),
        );
        spinner.finish_and_clear();

        match result {
            Ok((agents, leads)) => {
                self.agents = agents;
                self.leads = leads;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching agents or leads: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// (total, closed) lead counts for one agent in the loaded list.
    pub fn lead_stats(&self, agent_id: &str) -> (usize, usize) {
        agent_lead_stats(agent_id, &self.leads)
    }

    /// Validate, create on the backend, then append locally.
    pub async fn add(&mut self, client: &CrmClient, payload: &NewAgent) -> Result<Agent> {
        validate_new_agent(payload).map_err(|msg| anyhow!(msg))?;
        let agent = client.create_agent(payload).await?;
        info!("Created agent {} ({})", agent.name, agent.id);
        self.apply_created(agent.clone());
        Ok(agent)
    }

    /// Delete on the backend, then drop locally. Leads assigned to the
    /// agent are NOT cascaded; their references stop resolving on the
    /// next fetch and render as "Unassigned".
    pub async fn remove(&mut self, client: &CrmClient, id: &str) -> Result<()> {
        client.delete_agent(id).await?;
        let (owned, _) = self.lead_stats(id);
        if owned > 0 {
            warn!("Agent {} still owned {} lead(s); they are now unassigned", id, owned);
        }
        info!("Deleted agent {}", id);
        self.apply_deleted(id);
        Ok(())
    }

    pub fn apply_created(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    pub fn apply_deleted(&mut self, id: &str) {
        self.agents.retain(|a| a.id != id);
    }
}
