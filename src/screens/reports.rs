//! Reports screen state.

use crate::api::{CrmClient, LeadFilters};
use crate::errors::ApiResult;
use crate::models::{Agent, ClosedByAgentEntry, Lead, PipelineReport};
use crate::screens::fetch_spinner;
use serde::Serialize;
use tracing::error;

/// State for the reports view: everything the derived metrics need,
/// plus the two precomputed backend reports, fetched in one barrier.
#[derive(Debug, Default, Serialize)]
pub struct ReportsScreen {
    pub leads: Vec<Lead>,
    pub agents: Vec<Agent>,
    pub pipeline: PipelineReport,
    pub closed_by_agent: Vec<ClosedByAgentEntry>,
    pub last_week: Vec<Lead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five fetches run concurrently and all must complete before
    /// the screen renders anything.
    pub async fn load(&mut self, client: &CrmClient) -> ApiResult<()> {
        let spinner = fetch_spinner("Loading reports...");
        let filters = LeadFilters::default();
        let result = tokio::try_join!(
            client.list_leads(&filters),
            client.list_agents(),
            client.pipeline_report(),
            client.closed_by_agent_report(),
            client.last_week_report(),
        );
        spinner.finish_and_clear();

        match result {
            Ok((leads, agents, pipeline, closed_by_agent, last_week)) => {
                self.leads = leads;
                self.agents = agents;
                self.pipeline = pipeline;
                self.closed_by_agent = closed_by_agent;
                self.last_week = last_week;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching reports data: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_failure_records_error_and_leaves_state_empty() {
        let client = CrmClient::new("http://127.0.0.1:1", 1);
        let mut screen = ReportsScreen::new();

        assert!(screen.load(&client).await.is_err());
        assert!(screen.error.is_some());
        assert!(screen.leads.is_empty());
        assert!(screen.agents.is_empty());
        assert!(screen.last_week.is_empty());
    }
}
