//! Dashboard screen state.

use crate::api::{CrmClient, LeadFilters};
use crate::errors::ApiResult;
use crate::models::{ClosedByAgentEntry, Lead, PipelineReport};
use crate::screens::fetch_spinner;
use serde::Serialize;
use tracing::error;

/// State for the dashboard: the full lead list plus the two precomputed
/// report payloads, fetched together at activation.
#[derive(Debug, Default, Serialize)]
pub struct DashboardScreen {
    pub leads: Vec<Lead>,
    pub pipeline: PipelineReport,
    pub closed_by_agent: Vec<ClosedByAgentEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch leads and both reports concurrently; all three must land
    /// before the dashboard renders. On failure the screen stays empty
    /// with the error recorded.
    pub async fn load(&mut self, client: &CrmClient) -> ApiResult<()> {
        let spinner = fetch_spinner("Loading dashboard...");
        let filters = LeadFilters::default();
        let result = tokio::try_join!(
            client.list_leads(&filters),
            client.pipeline_report(),
            client.closed_by_agent_report(),
        );
        spinner.finish_and_clear();

        match result {
            Ok((leads, pipeline, closed_by_agent)) => {
                self.leads = leads;
                self.pipeline = pipeline;
                self.closed_by_agent = closed_by_agent;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching dashboard data: {}", e);
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
        let mut screen = DashboardScreen::new();

        assert!(screen.load(&client).await.is_err());
        assert!(screen.error.is_some());
        assert!(screen.leads.is_empty());
        assert_eq!(screen.pipeline.total_leads_in_pipeline, 0);
    }
}
