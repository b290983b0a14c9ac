//! Derived-metric computation over fetched CRM records.
//!
//! Everything here is a pure function of the lead/agent lists currently
//! in memory; nothing is cached or persisted, so staleness lasts only
//! until the next fetch. Functions never mutate their inputs.

use crate::models::{Agent, Lead, LeadStatus};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Per-agent totals computed from the lead list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub agent_id: String,
    pub name: String,
    pub total: usize,
    pub closed: usize,
    /// Percentage with two decimals ("33.33"), or "0" for agents with
    /// no leads.
    pub conversion_rate: String,
}

/// Count leads per status, one entry for each of the five statuses in
/// pipeline order. Absent statuses report 0.
pub fn status_histogram(leads: &[Lead]) -> Vec<(LeadStatus, usize)> {
    LeadStatus::ALL
        .iter()
        .map(|&status| (status, leads.iter().filter(|l| l.status == status).count()))
        .collect()
}

/// Overall conversion rate as a rounded integer percentage.
/// Returns 0 for an empty list.
pub fn conversion_rate(leads: &[Lead]) -> u32 {
    if leads.is_empty() {
        return 0;
    }
    let closed = leads.iter().filter(|l| l.status == LeadStatus::Closed).count();
    ((closed as f64 / leads.len() as f64) * 100.0).round() as u32
}

/// Leads closed within the trailing 7 days from `now`.
///
/// Non-Closed leads are excluded regardless of `closed_at`; Closed
/// leads without a usable close timestamp are excluded rather than
/// counted. The boundary is inclusive: exactly 7 days ago still counts.
pub fn closed_last_week(leads: &[Lead], now: DateTime<Utc>) -> Vec<Lead> {
    let one_week_ago = now - Duration::days(7);
    leads
        .iter()
        .filter(|l| l.status == LeadStatus::Closed)
        .filter(|l| l.closed_at.is_some_and(|closed| closed >= one_week_ago))
        .cloned()
        .collect()
}

/// Per-agent lead totals and conversion rates, in agent input order.
///
/// Leads are matched to agents by identifier, which covers both the
/// populated-object and raw-identifier reference shapes.
pub fn agent_performance(agents: &[Agent], leads: &[Lead]) -> Vec<AgentPerformance> {
    agents
        .iter()
        .map(|agent| {
            let (total, closed) = agent_lead_stats(&agent.id, leads);
            let rate = if total > 0 {
                format!("{:.2}", (closed as f64 / total as f64) * 100.0)
            } else {
                "0".to_string()
            };
            AgentPerformance {
                agent_id: agent.id.clone(),
                name: agent.name.clone(),
                total,
                closed,
                conversion_rate: rate,
            }
        })
        .collect()
}

/// (total, closed) lead counts for one agent.
pub fn agent_lead_stats(agent_id: &str, leads: &[Lead]) -> (usize, usize) {
    let total = leads.iter().filter(|l| l.agent_id() == Some(agent_id)).count();
    let closed = leads
        .iter()
        .filter(|l| l.agent_id() == Some(agent_id) && l.status == LeadStatus::Closed)
        .count();
    (total, closed)
}

/// Synthetic pipeline value: sum of `time_to_close * 100` over all
/// non-Closed leads. Leads without a `time_to_close` contribute 0.
pub fn pipeline_value(leads: &[Lead]) -> u64 {
    leads
        .iter()
        .filter(|l| l.status != LeadStatus::Closed)
        .map(|l| u64::from(l.time_to_close.unwrap_or(0)) * 100)
        .sum()
}

/// Number of leads still in the pipeline (not Closed).
pub fn pipeline_count(leads: &[Lead]) -> usize {
    leads.iter().filter(|l| l.status != LeadStatus::Closed).count()
}

/// The dashboard's synthetic revenue figure: closed leads x 2500.
pub fn closed_revenue(leads: &[Lead]) -> u64 {
    leads.iter().filter(|l| l.status == LeadStatus::Closed).count() as u64 * 2500
}

/// Mean `time_to_close` across leads that have one, rounded to whole
/// days. 0 when no lead carries an estimate.
pub fn avg_time_to_close(leads: &[Lead]) -> u32 {
    let estimates: Vec<u32> = leads.iter().filter_map(|l| l.time_to_close).collect();
    if estimates.is_empty() {
        return 0;
    }
    let sum: u64 = estimates.iter().map(|&d| u64::from(d)).sum();
    ((sum as f64 / estimates.len() as f64).round()) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentRef, LeadSource, Priority};
    use chrono::TimeZone;

    fn make_lead(id: &str, status: LeadStatus) -> Lead {
        Lead {
            id: id.to_string(),
            name: format!("Lead {}", id),
            source: LeadSource::Website,
            sales_agent: None,
            status,
            tags: Vec::new(),
            time_to_close: Some(30),
            priority: Priority::Medium,
            created_at: None,
            closed_at: None,
        }
    }

    fn make_agent(id: &str, name: &str) -> Agent {
        Agent {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
        }
    }

    #[test]
    fn test_histogram_order_and_sum() {
        let leads = vec![
            make_lead("1", LeadStatus::New),
            make_lead("2", LeadStatus::Closed),
            make_lead("3", LeadStatus::New),
            make_lead("4", LeadStatus::Qualified),
        ];

        let histogram = status_histogram(&leads);

        let order: Vec<LeadStatus> = histogram.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, LeadStatus::ALL.to_vec());

        let total: usize = histogram.iter().map(|(_, n)| n).sum();
        assert_eq!(total, leads.len());

        assert_eq!(histogram[0], (LeadStatus::New, 2));
        assert_eq!(histogram[1], (LeadStatus::Contacted, 0));
        assert_eq!(histogram[4], (LeadStatus::Closed, 1));
    }

    #[test]
    fn test_histogram_empty() {
        let histogram = status_histogram(&[]);
        assert_eq!(histogram.len(), 5);
        assert!(histogram.iter().all(|&(_, n)| n == 0));
    }

    #[test]
    fn test_conversion_rate_empty_is_zero() {
        assert_eq!(conversion_rate(&[]), 0);
    }

    #[test]
    fn test_conversion_rate_all_closed_is_100() {
        let leads = vec![
            make_lead("1", LeadStatus::Closed),
            make_lead("2", LeadStatus::Closed),
        ];
        assert_eq!(conversion_rate(&leads), 100);
    }

    #[test]
    fn test_conversion_rate_rounds() {
        // 1 of 3 closed = 33.33..% -> 33; 2 of 3 = 66.67% -> 67
        let leads = vec![
            make_lead("1", LeadStatus::Closed),
            make_lead("2", LeadStatus::New),
            make_lead("3", LeadStatus::New),
        ];
        assert_eq!(conversion_rate(&leads), 33);

        let leads = vec![
            make_lead("1", LeadStatus::Closed),
            make_lead("2", LeadStatus::Closed),
            make_lead("3", LeadStatus::New),
        ];
        assert_eq!(conversion_rate(&leads), 67);
    }

    #[test]
    fn test_closed_last_week_window() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();

        let mut recent = make_lead("1", LeadStatus::Closed);
        recent.closed_at = Some(now - Duration::days(3));

        let mut boundary = make_lead("2", LeadStatus::Closed);
        boundary.closed_at = Some(now - Duration::days(7));

        let mut stale = make_lead("3", LeadStatus::Closed);
        stale.closed_at = Some(now - Duration::days(8));

        let mut open_but_dated = make_lead("4", LeadStatus::Qualified);
        open_but_dated.closed_at = Some(now - Duration::days(1));

        let dateless = make_lead("5", LeadStatus::Closed);

        let leads = vec![recent, boundary, stale, open_but_dated, dateless];
        let closed = closed_last_week(&leads, now);

        let ids: Vec<&str> = closed.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_agent_performance_matches_both_reference_shapes() {
        let agents = vec![make_agent("a1", "Asha"), make_agent("a2", "Ravi")];

        let mut populated = make_lead("1", LeadStatus::Closed);
        populated.sales_agent = Some(AgentRef::Populated(make_agent("a1", "Asha")));

        let mut raw = make_lead("2", LeadStatus::New);
        raw.sales_agent = Some(AgentRef::Id("a1".to_string()));

        let mut other = make_lead("3", LeadStatus::New);
        other.sales_agent = Some(AgentRef::Id("a2".to_string()));

        let leads = vec![populated, raw, other];
        let perf = agent_performance(&agents, &leads);

        assert_eq!(perf.len(), 2);
        assert_eq!(perf[0].name, "Asha");
        assert_eq!(perf[0].total, 2);
        assert_eq!(perf[0].closed, 1);
        assert_eq!(perf[0].conversion_rate, "50.00");
        assert_eq!(perf[1].total, 1);
        assert_eq!(perf[1].closed, 0);
        assert_eq!(perf[1].conversion_rate, "0.00");
    }

    #[test]
    fn test_agent_performance_no_leads_is_zero_string() {
        let agents = vec![make_agent("a1", "Asha")];
        let perf = agent_performance(&agents, &[]);
        assert_eq!(perf[0].total, 0);
        assert_eq!(perf[0].conversion_rate, "0");
    }

    #[test]
    fn test_agent_performance_serializes_camel_case() {
        let agents = vec![make_agent("a1", "Asha")];
        let perf = agent_performance(&agents, &[]);
        let json = serde_json::to_value(&perf[0]).unwrap();
        assert_eq!(json["agentId"], "a1");
        assert_eq!(json["conversionRate"], "0");
        assert!(json.get("agent_id").is_none());
    }

    #[test]
    fn test_agent_performance_preserves_input_order() {
        let agents = vec![
            make_agent("z", "Zoya"),
            make_agent("a", "Asha"),
            make_agent("m", "Mira"),
        ];
        let perf = agent_performance(&agents, &[]);
        let names: Vec<&str> = perf.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zoya", "Asha", "Mira"]);
    }

    #[test]
    fn test_pipeline_value_skips_closed() {
        let mut open = make_lead("1", LeadStatus::New);
        open.time_to_close = Some(10);
        let mut closed = make_lead("2", LeadStatus::Closed);
        closed.time_to_close = Some(99);

        assert_eq!(pipeline_value(&[open, closed]), 1000);
    }

    #[test]
    fn test_pipeline_value_missing_estimate_counts_zero() {
        let mut open = make_lead("1", LeadStatus::Contacted);
        open.time_to_close = None;
        let mut other = make_lead("2", LeadStatus::New);
        other.time_to_close = Some(5);

        assert_eq!(pipeline_value(&[open, other]), 500);
    }

    #[test]
    fn test_pipeline_count() {
        let leads = vec![
            make_lead("1", LeadStatus::New),
            make_lead("2", LeadStatus::Closed),
            make_lead("3", LeadStatus::ProposalSent),
        ];
        assert_eq!(pipeline_count(&leads), 2);
    }

    #[test]
    fn test_closed_revenue() {
        let leads = vec![
            make_lead("1", LeadStatus::Closed),
            make_lead("2", LeadStatus::Closed),
            make_lead("3", LeadStatus::New),
        ];
        assert_eq!(closed_revenue(&leads), 5000);
    }

    #[test]
    fn test_avg_time_to_close() {
        let mut a = make_lead("1", LeadStatus::New);
        a.time_to_close = Some(10);
        let mut b = make_lead("2", LeadStatus::Closed);
        b.time_to_close = Some(21);
        let mut c = make_lead("3", LeadStatus::New);
        c.time_to_close = None;

        // (10 + 21) / 2 = 15.5 -> 16
        assert_eq!(avg_time_to_close(&[a, b, c]), 16);
        assert_eq!(avg_time_to_close(&[]), 0);
    }
}
