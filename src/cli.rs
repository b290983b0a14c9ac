//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{LeadSource, LeadStatus, Priority};
use crate::settings::Theme;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

/// Anvaya - command-line client for the Anvaya sales CRM
///
/// Track leads through the pipeline, manage sales agents, and view
/// dashboards and reports, all against the CRM REST backend.
///
/// Examples:
///   anvaya dashboard
///   anvaya leads list --status qualified --priority high
///   anvaya leads create --name "Acme Corp" --source website --time-to-close 30
///   anvaya leads comment 64f1a2 "Followed up by phone"
///   anvaya reports --format json
///   anvaya init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// CRM backend base URL
    ///
    /// Can also be set via ANVAYA_API_URL env var or .anvaya.toml config.
    #[arg(long, value_name = "URL", env = "ANVAYA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .anvaya.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(long, value_enum, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Top-level subcommands, one per screen.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the dashboard: totals, conversion rate, status breakdown
    Dashboard,

    /// Manage leads
    Leads {
        #[command(subcommand)]
        command: LeadsCommand,
    },

    /// Manage sales agents
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },

    /// Show the full reports view: histogram, last-week closes, agent
    /// performance, pipeline value
    Reports,

    /// View or change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Generate a default .anvaya.toml configuration file
    InitConfig,
}

#[derive(Subcommand, Debug, Clone)]
pub enum LeadsCommand {
    /// List leads, optionally filtered
    List {
        /// Filter by status (new, contacted, qualified, proposal-sent, closed)
        #[arg(long)]
        status: Option<LeadStatus>,

        /// Filter by assigned agent id
        #[arg(long, value_name = "AGENT_ID")]
        agent: Option<String>,

        /// Filter by priority (high, medium, low)
        #[arg(long)]
        priority: Option<Priority>,

        /// Filter by source (website, referral, cold-call, advertisement, email, other)
        #[arg(long)]
        source: Option<LeadSource>,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show one lead with its comments
    Show {
        /// Lead id
        id: String,
    },

    /// Create a new lead
    Create {
        /// Lead name
        #[arg(long)]
        name: String,

        /// Lead source
        #[arg(long)]
        source: LeadSource,

        /// Assigned agent id
        #[arg(long, value_name = "AGENT_ID")]
        agent: Option<String>,

        /// Initial status
        #[arg(long, default_value = "new")]
        status: LeadStatus,

        /// Priority
        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Tags (comma-separated; fixed vocabulary)
        #[arg(long, value_name = "TAGS", value_delimiter = ',')]
        tags: Vec<String>,

        /// Estimated days to close
        #[arg(long, value_name = "DAYS")]
        time_to_close: u32,
    },

    /// Update a lead (unspecified fields keep their current values)
    Update {
        /// Lead id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        source: Option<LeadSource>,

        /// Assigned agent id ("none" to unassign)
        #[arg(long, value_name = "AGENT_ID")]
        agent: Option<String>,

        #[arg(long)]
        status: Option<LeadStatus>,

        #[arg(long)]
        priority: Option<Priority>,

        /// Replace the tag set (comma-separated)
        #[arg(long, value_name = "TAGS", value_delimiter = ',')]
        tags: Option<Vec<String>>,

        #[arg(long, value_name = "DAYS")]
        time_to_close: Option<u32>,
    },

    /// Delete a lead
    Delete {
        /// Lead id
        id: String,
    },

    /// Append a comment to a lead
    Comment {
        /// Lead id
        id: String,

        /// Comment text
        text: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AgentsCommand {
    /// List agents with their lead counts
    List,

    /// Add a new sales agent
    Add {
        /// Agent name
        #[arg(long)]
        name: String,

        /// Agent email
        #[arg(long)]
        email: String,
    },

    /// Remove an agent (their leads are NOT deleted and become
    /// unassigned on the next fetch)
    Remove {
        /// Agent id
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print current settings
    Show,

    /// Change one or more settings
    Set {
        /// Profile name
        #[arg(long)]
        name: Option<String>,

        /// Profile email
        #[arg(long)]
        email: Option<String>,

        /// Theme (light, dark, auto)
        #[arg(long)]
        theme: Option<Theme>,

        /// Enable or disable email notifications
        #[arg(long, value_name = "BOOL")]
        email_notifications: Option<bool>,

        /// Enable or disable two-factor authentication
        #[arg(long, value_name = "BOOL")]
        two_factor_auth: Option<bool>,
    },
}

/// Output format for screen rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain-text tables (default)
    #[default]
    Table,
    /// JSON
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Command::Settings {
            command:
                SettingsCommand::Set {
                    name,
                    email,
                    theme,
                    email_notifications,
                    two_factor_auth,
                },
        } = &self.command
        {
            if name.is_none()
                && email.is_none()
                && theme.is_none()
                && email_notifications.is_none()
                && two_factor_auth.is_none()
            {
                return Err("settings set: nothing to change (pass at least one option)".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            command: Command::Dashboard,
            api_url: None,
            config: None,
            format: None,
            timeout: None,
            verbose: false,
            quiet: false,
        }
    }
}
