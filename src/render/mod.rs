//! Presentation layer: plain-text tables and JSON for every screen.
//!
//! Table output is built section by section into one string; JSON output
//! serializes the screen state together with its derived metrics so the
//! two formats always agree.

use crate::metrics;
use crate::models::{ClosedByAgentEntry, Comment, Lead};
use crate::screens::agents::AgentsScreen;
use crate::screens::dashboard::DashboardScreen;
use crate::screens::lead_details::LeadDetailsScreen;
use crate::screens::leads::LeadListScreen;
use crate::screens::reports::ReportsScreen;
use crate::settings::{Settings, Theme};
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Section heading, underlined. The dark theme gets heavier rules.
fn heading(text: &str, theme: Theme) -> String {
    let rule = match theme {
        Theme::Dark => "=",
        Theme::Light | Theme::Auto => "-",
    };
    format!("{}\n{}\n", text, rule.repeat(text.len()))
}

/// Group digits in threes: 123456 -> "123,456".
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

// --- Dashboard ---

pub fn render_dashboard(screen: &DashboardScreen, theme: Theme) -> String {
    let leads = &screen.leads;
    let mut output = String::new();

    output.push_str(&heading("CRM Dashboard", theme));
    output.push('\n');

    output.push_str(&format!("  Total Leads:        {}\n", leads.len()));
    output.push_str(&format!(
        "  Conversion Rate:    {}%\n",
        metrics::conversion_rate(leads)
    ));
    output.push_str(&format!(
        "  Avg. Time to Close: {} days\n",
        metrics::avg_time_to_close(leads)
    ));
    output.push_str(&format!(
        "  Revenue:            ${}\n",
        group_thousands(metrics::closed_revenue(leads))
    ));
    output.push('\n');

    output.push_str(&heading("Lead Status", theme));
    for (status, count) in metrics::status_histogram(leads) {
        output.push_str(&format!("  {:<14} {:>4} leads\n", status.to_string(), count));
    }
    output.push('\n');

    output.push_str(&format!(
        "  Leads in pipeline (backend): {}\n",
        screen.pipeline.total_leads_in_pipeline
    ));

    output
}

pub fn dashboard_json(screen: &DashboardScreen) -> Result<String> {
    let leads = &screen.leads;
    let value = serde_json::json!({
        "totalLeads": leads.len(),
        "conversionRate": metrics::conversion_rate(leads),
        "avgTimeToClose": metrics::avg_time_to_close(leads),
        "revenue": metrics::closed_revenue(leads),
        "statusCounts": histogram_json(leads),
        "pipelineReport": screen.pipeline,
        "closedByAgent": screen.closed_by_agent,
        "leads": leads,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn histogram_json(leads: &[Lead]) -> Vec<serde_json::Value> {
    metrics::status_histogram(leads)
        .into_iter()
        .map(|(status, count)| {
            serde_json::json!({ "status": status, "count": count })
        })
        .collect()
}

// --- Lead list ---

pub fn render_lead_list(screen: &LeadListScreen, theme: Theme) -> String {
    let mut output = String::new();
    output.push_str(&heading("Lead Management", theme));

    if screen.leads.is_empty() {
        output.push_str("\nNo leads found. Try adjusting your filters or create a new lead.\n");
        return output;
    }

    output.push_str(&format!(
        "\n{:<24} {:<14} {:<9} {:<18} {:>14}  {}\n",
        "Name", "Status", "Priority", "Sales Agent", "Time to Close", "Id"
    ));
    for lead in &screen.leads {
        output.push_str(&render_lead_row(lead));
    }
    output.push_str(&format!("\n  {} lead(s)\n", screen.leads.len()));

    output
}

fn render_lead_row(lead: &Lead) -> String {
    let days = lead
        .time_to_close
        .map(|d| format!("{} days", d))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<24} {:<14} {:<9} {:<18} {:>14}  {}\n",
        lead.name,
        lead.status.to_string(),
        lead.priority.to_string(),
        lead.agent_name(),
        days,
        lead.id
    )
}

pub fn lead_list_json(screen: &LeadListScreen) -> Result<String> {
    Ok(serde_json::to_string_pretty(screen)?)
}

// --- Lead details ---

pub fn render_lead_details(screen: &LeadDetailsScreen, theme: Theme) -> String {
    let mut output = String::new();

    let Some(ref lead) = screen.lead else {
        output.push_str("Lead not found\n");
        return output;
    };

    output.push_str(&heading(&format!("Lead Details: {}", lead.name), theme));
    output.push('\n');
    output.push_str(&format!("  Lead Name:     {}\n", lead.name));
    output.push_str(&format!("  Sales Agent:   {}\n", lead.agent_name()));
    output.push_str(&format!("  Lead Source:   {}\n", lead.source));
    output.push_str(&format!("  Status:        {}\n", lead.status));
    output.push_str(&format!("  Priority:      {}\n", lead.priority));
    if let Some(days) = lead.time_to_close {
        output.push_str(&format!("  Time to Close: {} days\n", days));
    }
    if !lead.tags.is_empty() {
        output.push_str(&format!("  Tags:          {}\n", lead.tags.join(", ")));
    }
    output.push_str(&format!("  Created:       {}\n", timestamp(lead.created_at)));
    if lead.closed_at.is_some() {
        output.push_str(&format!("  Closed:        {}\n", timestamp(lead.closed_at)));
    }
    output.push('\n');

    output.push_str(&heading("Comments & Activity", theme));
    if screen.comments.is_empty() {
        output.push_str("\nNo comments yet. Be the first to add one.\n");
    } else {
        for comment in &screen.comments {
            output.push_str(&render_comment(comment));
        }
    }

    output
}

fn render_comment(comment: &Comment) -> String {
    format!(
        "\n  {} ({})\n  {}\n",
        comment.author_name(),
        timestamp(comment.created_at),
        comment.comment_text
    )
}

pub fn lead_details_json(screen: &LeadDetailsScreen) -> Result<String> {
    Ok(serde_json::to_string_pretty(screen)?)
}

// --- Agents ---

pub fn render_agents(screen: &AgentsScreen, theme: Theme) -> String {
    let mut output = String::new();
    output.push_str(&heading("Sales Agent Management", theme));

    if screen.agents.is_empty() {
        output.push_str("\nNo sales agents found.\n");
        return output;
    }

    for agent in &screen.agents {
        let (total, closed) = screen.lead_stats(&agent.id);
        output.push_str(&format!(
            "\n  {} <{}>\n    Leads: {}  Closed: {}  [{}]\n",
            agent.name, agent.email, total, closed, agent.id
        ));
    }

    output
}

pub fn agents_json(screen: &AgentsScreen) -> Result<String> {
    let cards: Vec<serde_json::Value> = screen
        .agents
        .iter()
        .map(|agent| {
            let (total, closed) = screen.lead_stats(&agent.id);
            serde_json::json!({
                "id": agent.id,
                "name": agent.name,
                "email": agent.email,
                "totalLeads": total,
                "closedLeads": closed,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&cards)?)
}

// --- Reports ---

pub fn render_reports(screen: &ReportsScreen, now: DateTime<Utc>, theme: Theme) -> String {
    let leads = &screen.leads;
    let closed_last_week = metrics::closed_last_week(leads, now);
    let mut output = String::new();

    output.push_str(&heading("Anvaya CRM Reports", theme));
    output.push('\n');

    output.push_str(&format!("  Total Leads:       {}\n", leads.len()));
    output.push_str(&format!(
        "  Leads in Pipeline: {}\n",
        metrics::pipeline_count(leads)
    ));
    output.push_str(&format!(
        "  Pipeline Value:    ${}\n",
        group_thousands(metrics::pipeline_value(leads))
    ));
    output.push_str(&format!(
        "  Closed Last Week:  {}\n",
        closed_last_week.len()
    ));
    output.push('\n');

    output.push_str(&heading("Lead Status Distribution", theme));
    let histogram = metrics::status_histogram(leads);
    let max = histogram.iter().map(|&(_, n)| n).max().unwrap_or(0).max(1);
    for (status, count) in histogram {
        let bar_len = count * 30 / max;
        output.push_str(&format!(
            "  {:<14} {:>4}  {}\n",
            status.to_string(),
            count,
            "#".repeat(bar_len)
        ));
    }
    output.push('\n');

    output.push_str(&heading("Leads Closed Last Week", theme));
    if closed_last_week.is_empty() {
        output.push_str("\n  None.\n");
    } else {
        for lead in &closed_last_week {
            output.push_str(&format!(
                "\n  {} (closed {})",
                lead.name,
                timestamp(lead.closed_at)
            ));
        }
        output.push('\n');
    }
    output.push('\n');

    output.push_str(&heading("Agent Conversion Rates", theme));
    output.push_str(&format!(
        "\n{:<20} {:>12} {:>13} {:>17}\n",
        "Agent", "Total Leads", "Closed Leads", "Conversion Rate"
    ));
    for perf in metrics::agent_performance(&screen.agents, leads) {
        output.push_str(&format!(
            "{:<20} {:>12} {:>13} {:>16}%\n",
            perf.name, perf.total, perf.closed, perf.conversion_rate
        ));
    }
    output.push('\n');

    output.push_str(&heading("Backend Reports", theme));
    output.push_str(&format!(
        "\n  Leads in pipeline (precomputed): {}\n",
        screen.pipeline.total_leads_in_pipeline
    ));
    output.push_str(&format!(
        "  Closed last week (precomputed):  {}\n",
        screen.last_week.len()
    ));
    if !screen.closed_by_agent.is_empty() {
        output.push_str("  Closed by agent (precomputed):\n");
        for entry in &screen.closed_by_agent {
            output.push_str(&format!(
                "    {:<20} {}\n",
                closed_by_agent_label(entry),
                entry.closed_leads
            ));
        }
    }

    output
}

fn closed_by_agent_label(entry: &ClosedByAgentEntry) -> String {
    match entry.agent {
        Some(ref agent) => agent
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| agent.id().to_string()),
        None => "Unknown".to_string(),
    }
}

pub fn reports_json(screen: &ReportsScreen, now: DateTime<Utc>) -> Result<String> {
    let leads = &screen.leads;
    let value = serde_json::json!({
        "totalLeads": leads.len(),
        "leadsInPipeline": metrics::pipeline_count(leads),
        "pipelineValue": metrics::pipeline_value(leads),
        "statusCounts": histogram_json(leads),
        "closedLastWeek": metrics::closed_last_week(leads, now),
        "agentPerformance": metrics::agent_performance(&screen.agents, leads),
        "pipelineReport": screen.pipeline,
        "closedByAgent": screen.closed_by_agent,
        "lastWeekReport": screen.last_week,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

// --- Settings ---

pub fn render_settings(settings: &Settings, theme: Theme) -> String {
    let mut output = String::new();
    output.push_str(&heading("Settings", theme));
    output.push('\n');
    output.push_str(&format!("  Name:                {}\n", settings.name));
    output.push_str(&format!("  Email:               {}\n", settings.email));
    output.push_str(&format!("  Theme:               {}\n", settings.theme));
    output.push_str(&format!(
        "  Email Notifications: {}\n",
        if settings.email_notifications { "on" } else { "off" }
    ));
    output.push_str(&format!(
        "  Two-Factor Auth:     {}\n",
        if settings.two_factor_auth { "on" } else { "off" }
    ));
    output
}

pub fn settings_json(settings: &Settings) -> Result<String> {
    Ok(serde_json::to_string_pretty(settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadSource, LeadStatus, Priority};

    fn make_lead(name: &str, status: LeadStatus) -> Lead {
        Lead {
            id: "l1".to_string(),
            name: name.to_string(),
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

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_heading_theme_rules() {
        assert!(heading("Hi", Theme::Light).contains("--"));
        assert!(heading("Hi", Theme::Dark).contains("=="));
    }

    #[test]
    fn test_dashboard_lists_every_status() {
        let mut screen = DashboardScreen::new();
        screen.leads = vec![make_lead("Acme", LeadStatus::New)];
        let out = render_dashboard(&screen, Theme::Light);
        for status in LeadStatus::ALL {
            assert!(out.contains(&status.to_string()), "missing {}", status);
        }
    }

    #[test]
    fn test_lead_list_empty_state() {
        let screen = LeadListScreen::default();
        let out = render_lead_list(&screen, Theme::Light);
        assert!(out.contains("No leads found"));
    }

    #[test]
    fn test_lead_details_unassigned_agent() {
        let mut screen = LeadDetailsScreen::new();
        screen.lead = Some(make_lead("Acme", LeadStatus::New));
        let out = render_lead_details(&screen, Theme::Light);
        assert!(out.contains("Unassigned"));
        assert!(out.contains("No comments yet"));
    }

    #[test]
    fn test_reports_json_shape() {
        let mut screen = ReportsScreen::new();
        screen.leads = vec![
            make_lead("Acme", LeadStatus::New),
            make_lead("Globex", LeadStatus::Closed),
        ];
        let json = reports_json(&screen, Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalLeads"], 2);
        assert_eq!(value["leadsInPipeline"], 1);
        assert_eq!(value["pipelineValue"], 3000);
        assert_eq!(value["statusCounts"].as_array().unwrap().len(), 5);
    }
}
