//! Data models for the CRM client.
//!
//! This module contains the wire-level data structures consumed from and
//! sent to the CRM backend: leads, agents, comments, and the precomputed
//! report payloads. Normalization of backend quirks (dual agent-reference
//! representation, unparseable timestamps) happens here so the rest of
//! the application sees one clean shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a lead.
///
/// The variant order is the pipeline order; charts and breakdowns
/// enumerate statuses in exactly this sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    Closed,
}

impl LeadStatus {
    /// All statuses in fixed pipeline order.
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::ProposalSent,
        LeadStatus::Closed,
    ];
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadStatus::New => write!(f, "New"),
            LeadStatus::Contacted => write!(f, "Contacted"),
            LeadStatus::Qualified => write!(f, "Qualified"),
            LeadStatus::ProposalSent => write!(f, "Proposal Sent"),
            LeadStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "proposal sent" | "proposal" => Ok(LeadStatus::ProposalSent),
            "closed" => Ok(LeadStatus::Closed),
            other => Err(format!(
                "unknown status '{}' (expected: new, contacted, qualified, proposal-sent, closed)",
                other
            )),
        }
    }
}

/// Where a lead came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadSource {
    Website,
    Referral,
    #[serde(rename = "Cold Call")]
    ColdCall,
    Advertisement,
    Email,
    Other,
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadSource::Website => write!(f, "Website"),
            LeadSource::Referral => write!(f, "Referral"),
            LeadSource::ColdCall => write!(f, "Cold Call"),
            LeadSource::Advertisement => write!(f, "Advertisement"),
            LeadSource::Email => write!(f, "Email"),
            LeadSource::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for LeadSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "website" => Ok(LeadSource::Website),
            "referral" => Ok(LeadSource::Referral),
            "cold call" => Ok(LeadSource::ColdCall),
            "advertisement" | "ad" => Ok(LeadSource::Advertisement),
            "email" => Ok(LeadSource::Email),
            "other" => Ok(LeadSource::Other),
            other => Err(format!(
                "unknown source '{}' (expected: website, referral, cold-call, advertisement, email, other)",
                other
            )),
        }
    }
}

/// Priority of a lead. New leads default to Medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!(
                "unknown priority '{}' (expected: high, medium, low)",
                other
            )),
        }
    }
}

/// Fixed tag vocabulary accepted by lead forms.
pub const TAG_VOCABULARY: [&str; 5] =
    ["High Value", "Follow-up", "Enterprise", "Trial", "Partner"];

/// A salesperson who may be assigned leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A reference from a lead (or comment) to an agent.
///
/// The backend emits either the populated agent object or the raw agent
/// identifier depending on the endpoint. Both shapes deserialize into
/// this type and all consumers match agents by [`AgentRef::id`]; the
/// dual representation never leaks past this module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentRef {
    Populated(Agent),
    Id(String),
}

impl AgentRef {
    /// The agent identifier, regardless of representation.
    pub fn id(&self) -> &str {
        match self {
            AgentRef::Populated(agent) => &agent.id,
            AgentRef::Id(id) => id,
        }
    }

    /// The agent name, if this reference carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            AgentRef::Populated(agent) => Some(&agent.name),
            AgentRef::Id(_) => None,
        }
    }
}

/// A sales prospect tracked through the status pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub source: LeadSource,
    /// Absent means "Unassigned".
    #[serde(rename = "salesAgent", default)]
    pub sales_agent: Option<AgentRef>,
    pub status: LeadStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Estimated days to close. Absent records count as 0 toward the
    /// pipeline value.
    #[serde(rename = "timeToClose", default)]
    pub time_to_close: Option<u32>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "createdAt", default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    /// Only meaningful when status is Closed. Unparseable values from
    /// the backend become `None` rather than failing the whole fetch.
    #[serde(rename = "closedAt", default, deserialize_with = "lenient_datetime")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Identifier of the assigned agent, if any.
    pub fn agent_id(&self) -> Option<&str> {
        self.sales_agent.as_ref().map(AgentRef::id)
    }

    /// Display name for the assigned agent column.
    pub fn agent_name(&self) -> &str {
        self.sales_agent
            .as_ref()
            .and_then(AgentRef::name)
            .unwrap_or("Unassigned")
    }
}

/// A note attached to a lead. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub lead: Option<String>,
    /// Absent author renders as "System".
    #[serde(default)]
    pub author: Option<AgentRef>,
    #[serde(rename = "commentText")]
    pub comment_text: String,
    #[serde(rename = "createdAt", default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Display name for the comment author.
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(AgentRef::name)
            .unwrap_or("System")
    }
}

/// Request body for creating or fully replacing a lead.
///
/// Updates are full-record replaces, so the same payload serves POST and
/// PATCH.
#[derive(Debug, Clone, Serialize)]
pub struct LeadPayload {
    pub name: String,
    pub source: LeadSource,
    #[serde(rename = "salesAgent", skip_serializing_if = "Option::is_none")]
    pub sales_agent: Option<String>,
    pub status: LeadStatus,
    pub tags: Vec<String>,
    /// Omitted from the body when the record carries no estimate.
    #[serde(rename = "timeToClose", skip_serializing_if = "Option::is_none")]
    pub time_to_close: Option<u32>,
    pub priority: Priority,
}

/// Request body for creating an agent.
#[derive(Debug, Clone, Serialize)]
pub struct NewAgent {
    pub name: String,
    pub email: String,
}

/// Request body for appending a comment to a lead.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    #[serde(rename = "commentText")]
    pub comment_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Precomputed pipeline report from `GET /report/pipeline`.
///
/// The schema belongs to the backend; unknown fields are carried through
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    #[serde(rename = "totalLeadsInPipeline", default)]
    pub total_leads_in_pipeline: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One row of `GET /report/closed-by-agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedByAgentEntry {
    #[serde(default)]
    pub agent: Option<AgentRef>,
    #[serde(rename = "closedLeads", alias = "count", default)]
    pub closed_leads: u64,
}

/// Deserialize an optional timestamp, mapping missing or unparseable
/// values to `None` instead of erroring.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_pipeline_order() {
        assert!(LeadStatus::New < LeadStatus::Contacted);
        assert!(LeadStatus::Qualified < LeadStatus::ProposalSent);
        assert!(LeadStatus::ProposalSent < LeadStatus::Closed);
        assert_eq!(LeadStatus::ALL.len(), 5);
        assert_eq!(LeadStatus::ALL[0], LeadStatus::New);
        assert_eq!(LeadStatus::ALL[4], LeadStatus::Closed);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&LeadStatus::ProposalSent).unwrap();
        assert_eq!(json, "\"Proposal Sent\"");
        let status: LeadStatus = serde_json::from_str("\"Proposal Sent\"").unwrap();
        assert_eq!(status, LeadStatus::ProposalSent);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "proposal-sent".parse::<LeadStatus>(),
            Ok(LeadStatus::ProposalSent)
        );
        assert_eq!("Closed".parse::<LeadStatus>(), Ok(LeadStatus::Closed));
        assert!("won".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("cold-call".parse::<LeadSource>(), Ok(LeadSource::ColdCall));
        assert_eq!("Website".parse::<LeadSource>(), Ok(LeadSource::Website));
        assert!("carrier pigeon".parse::<LeadSource>().is_err());
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_agent_ref_populated() {
        let json = r#"{"_id": "a1", "name": "Asha", "email": "asha@example.com"}"#;
        let agent_ref: AgentRef = serde_json::from_str(json).unwrap();
        assert_eq!(agent_ref.id(), "a1");
        assert_eq!(agent_ref.name(), Some("Asha"));
    }

    #[test]
    fn test_agent_ref_raw_id() {
        let agent_ref: AgentRef = serde_json::from_str("\"a1\"").unwrap();
        assert_eq!(agent_ref.id(), "a1");
        assert_eq!(agent_ref.name(), None);
    }

    #[test]
    fn test_lead_deserializes_both_agent_shapes() {
        let populated = r#"{
            "_id": "l1",
            "name": "Acme Corp",
            "source": "Website",
            "salesAgent": {"_id": "a1", "name": "Asha", "email": "a@x.com"},
            "status": "New",
            "timeToClose": 30,
            "priority": "Medium"
        }"#;
        let raw = r#"{
            "_id": "l2",
            "name": "Globex",
            "source": "Referral",
            "salesAgent": "a1",
            "status": "Contacted",
            "timeToClose": 14,
            "priority": "High"
        }"#;

        let lead1: Lead = serde_json::from_str(populated).unwrap();
        let lead2: Lead = serde_json::from_str(raw).unwrap();
        assert_eq!(lead1.agent_id(), Some("a1"));
        assert_eq!(lead2.agent_id(), Some("a1"));
        assert_eq!(lead1.agent_name(), "Asha");
        assert_eq!(lead2.agent_name(), "Unassigned");
    }

    #[test]
    fn test_lead_unassigned() {
        let json = r#"{
            "_id": "l3",
            "name": "Initech",
            "source": "Other",
            "status": "New"
        }"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.agent_id(), None);
        assert_eq!(lead.agent_name(), "Unassigned");
        assert_eq!(lead.time_to_close, None);
        assert_eq!(lead.priority, Priority::Medium);
    }

    #[test]
    fn test_lenient_closed_at() {
        let valid = r#"{
            "_id": "l4", "name": "A", "source": "Email", "status": "Closed",
            "closedAt": "2024-05-01T12:00:00Z"
        }"#;
        let garbage = r#"{
            "_id": "l5", "name": "B", "source": "Email", "status": "Closed",
            "closedAt": "not-a-date"
        }"#;

        let lead: Lead = serde_json::from_str(valid).unwrap();
        assert!(lead.closed_at.is_some());

        let lead: Lead = serde_json::from_str(garbage).unwrap();
        assert!(lead.closed_at.is_none());
    }

    #[test]
    fn test_comment_author_fallback() {
        let json = r#"{"_id": "c1", "commentText": "Called them back"}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.author_name(), "System");
    }

    #[test]
    fn test_lead_payload_wire_shape() {
        let payload = LeadPayload {
            name: "Acme Corp".to_string(),
            source: LeadSource::ColdCall,
            sales_agent: Some("a1".to_string()),
            status: LeadStatus::New,
            tags: vec!["High Value".to_string()],
            time_to_close: Some(30),
            priority: Priority::Medium,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["source"], "Cold Call");
        assert_eq!(json["salesAgent"], "a1");
        assert_eq!(json["timeToClose"], 30);
    }

    #[test]
    fn test_lead_payload_omits_absent_estimate() {
        let payload = LeadPayload {
            name: "Acme Corp".to_string(),
            source: LeadSource::Website,
            sales_agent: None,
            status: LeadStatus::New,
            tags: Vec::new(),
            time_to_close: None,
            priority: Priority::Medium,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("timeToClose").is_none());
        assert!(json.get("salesAgent").is_none());
    }

    #[test]
    fn test_pipeline_report_keeps_unknown_fields() {
        let json = r#"{"totalLeadsInPipeline": 12, "asOf": "2024-05-01"}"#;
        let report: PipelineReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.total_leads_in_pipeline, 12);
        assert!(report.extra.contains_key("asOf"));
    }
}
