//! Lead details screen state: one lead, its comment thread, and
//! append-only comment submission.

use crate::api::CrmClient;
use crate::errors::ApiResult;
use crate::models::{Comment, Lead, NewComment};
use crate::screens::{fetch_spinner, validate_comment_text};
use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Default, Serialize)]
pub struct LeadDetailsScreen {
    pub lead: Option<Lead>,
    pub comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LeadDetailsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the lead, then its comment thread. A missing lead surfaces
    /// as the NotFound error path.
    pub async fn load(&mut self, client: &CrmClient, id: &str) -> ApiResult<()> {
        let spinner = fetch_spinner("Loading lead details...");
        let result: ApiResult<(Lead, Vec<Comment>)> = async {
            let lead = client.get_lead(id).await?;
            let comments = client.list_comments(id).await?;
            Ok((lead, comments))
        }
        .await;
        spinner.finish_and_clear();

        match result {
            Ok((lead, comments)) => {
                self.lead = Some(lead);
                self.comments = comments;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching lead details: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Submit a comment, inferring the author from the lead's assigned
    /// agent, then append the returned record locally. Blank text is
    /// rejected before any request.
    pub async fn submit_comment(&mut self, client: &CrmClient, text: &str) -> Result<Comment> {
        validate_comment_text(text).map_err(|msg| anyhow!(msg))?;

        let lead = self
            .lead
            .as_ref()
            .ok_or_else(|| anyhow!("No lead loaded"))?;

        let payload = NewComment {
            comment_text: text.trim().to_string(),
            author: lead.agent_id().map(str::to_string),
        };

        let comment = client.create_comment(&lead.id, &payload).await?;
        info!("Added comment to lead {}", lead.id);
        self.apply_comment(comment.clone());
        Ok(comment)
    }

    /// Append-only splice: no reordering, no refetch.
    pub fn apply_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_comment(id: &str, text: &str) -> Comment {
        Comment {
            id: id.to_string(),
            lead: Some("l1".to_string()),
            author: None,
            comment_text: text.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_apply_comment_appends_in_order() {
        let mut screen = LeadDetailsScreen::default();
        screen.comments = vec![make_comment("c1", "first")];

        screen.apply_comment(make_comment("c2", "second"));
        screen.apply_comment(make_comment("c3", "third"));

        let texts: Vec<&str> = screen
            .comments
            .iter()
            .map(|c| c.comment_text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_blank_comment_rejected_without_network() {
        // A client pointing nowhere: if validation let the call through,
        // this would fail with a connect error instead of the
        // validation message.
        let client = CrmClient::new("http://127.0.0.1:1", 1);
        let mut screen = LeadDetailsScreen::default();

        let err = screen.submit_comment(&client, "   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Comment text cannot be empty");
        assert!(screen.comments.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_records_error_and_leaves_state_empty() {
        let client = CrmClient::new("http://127.0.0.1:1", 1);
        let mut screen = LeadDetailsScreen::new();

        assert!(screen.load(&client, "l1").await.is_err());
        assert!(screen.error.is_some());
        assert!(screen.lead.is_none());
        assert!(screen.comments.is_empty());
    }
}
