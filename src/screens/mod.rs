//! Per-screen state controllers.
//!
//! Every screen follows the same protocol: fetch its collections on
//! activation (independent fetches joined concurrently), show a spinner
//! while in flight, replace local state wholesale on success, record the
//! error on failure. Writes validate client-side first, call the
//! backend, then splice the affected record into local state without a
//! refetch.

pub mod agents;
pub mod dashboard;
pub mod lead_details;
pub mod leads;
pub mod reports;

use crate::models::{LeadPayload, NewAgent, TAG_VOCABULARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a screen's fetches are in flight. Callers must
/// clear it whether the fetch succeeds or fails.
pub(crate) fn fetch_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Client-side lead validation. Runs before any network call.
pub fn validate_lead_payload(payload: &LeadPayload) -> Result<(), String> {
    if payload.name.trim().is_empty() {
        return Err("Lead name is required".to_string());
    }
    if payload.time_to_close == Some(0) {
        return Err("Time to close must be at least 1 day".to_string());
    }
    for tag in &payload.tags {
        if !TAG_VOCABULARY.contains(&tag.as_str()) {
            return Err(format!(
                "Unknown tag '{}' (expected one of: {})",
                tag,
                TAG_VOCABULARY.join(", ")
            ));
        }
    }
    Ok(())
}

/// Client-side agent validation. Runs before any network call.
pub fn validate_new_agent(payload: &NewAgent) -> Result<(), String> {
    if payload.name.trim().is_empty() {
        return Err("Agent name is required".to_string());
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err("A valid agent email is required".to_string());
    }
    Ok(())
}

/// Empty or whitespace-only comment text is rejected without a request.
pub fn validate_comment_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Comment text cannot be empty".to_string());
    }
    Ok(())
}
