//! Anvaya - command-line client for the Anvaya sales CRM
//!
//! Tracks leads through the sales pipeline, manages agents, and renders
//! dashboards and reports against the CRM REST backend.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, validation, config failure, etc.)

mod api;
mod cli;
mod config;
mod errors;
mod metrics;
mod models;
mod render;
mod screens;
mod settings;

use anyhow::{Context, Result};
use api::{CrmClient, LeadFilters};
use chrono::Utc;
use cli::{AgentsCommand, Args, Command, LeadsCommand, OutputFormat, SettingsCommand};
use config::Config;
use models::NewAgent;
use screens::agents::AgentsScreen;
use screens::dashboard::DashboardScreen;
use screens::lead_details::LeadDetailsScreen;
use screens::leads::{merge_lead_update, LeadListScreen};
use screens::reports::ReportsScreen;
use settings::SettingsStore;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    debug!("Anvaya v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("\nError: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle `init-config`: generate a default .anvaya.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".anvaya.toml");

    if path.exists() {
        eprintln!(".anvaya.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .anvaya.toml")?;

    println!("Created .anvaya.toml with default settings.");
    println!("Edit it to point at your CRM backend.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            debug!("Loaded default config from .anvaya.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Dispatch the parsed command against the backend.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let format = output_format(&args, &config);
    let client = CrmClient::new(&config.api.base_url, config.api.timeout_seconds);
    let mut store = SettingsStore::open(Path::new(&config.general.settings_path))?;
    let theme = store.theme();

    debug!("Backend: {}", client.base_url());

    match args.command {
        Command::Dashboard => {
            let mut screen = DashboardScreen::new();
            screen.load(&client).await?;
            match format {
                OutputFormat::Table => print!("{}", render::render_dashboard(&screen, theme)),
                OutputFormat::Json => println!("{}", render::dashboard_json(&screen)?),
            }
        }

        Command::Leads { command } => {
            run_leads_command(command, &client, format, theme).await?;
        }

        Command::Agents { command } => {
            run_agents_command(command, &client, format, theme).await?;
        }

        Command::Reports => {
            let mut screen = ReportsScreen::new();
            screen.load(&client).await?;
            match format {
                OutputFormat::Table => {
                    print!("{}", render::render_reports(&screen, Utc::now(), theme))
                }
                OutputFormat::Json => println!("{}", render::reports_json(&screen, Utc::now())?),
            }
        }

        Command::Settings { command } => match command {
            SettingsCommand::Show => match format {
                OutputFormat::Table => print!("{}", render::render_settings(store.get(), theme)),
                OutputFormat::Json => println!("{}", render::settings_json(store.get())?),
            },
            SettingsCommand::Set {
                name,
                email,
                theme: new_theme,
                email_notifications,
                two_factor_auth,
            } => {
                store.update(|s| {
                    if let Some(name) = name {
                        s.name = name;
                    }
                    if let Some(email) = email {
                        s.email = email;
                    }
                    if let Some(theme) = new_theme {
                        s.theme = theme;
                    }
                    if let Some(on) = email_notifications {
                        s.email_notifications = on;
                    }
                    if let Some(on) = two_factor_auth {
                        s.two_factor_auth = on;
                    }
                })?;
                println!("Settings saved.");
            }
        },

        // Handled before logging init
        Command::InitConfig => unreachable!(),
    }

    Ok(())
}

async fn run_leads_command(
    command: LeadsCommand,
    client: &CrmClient,
    format: OutputFormat,
    theme: settings::Theme,
) -> Result<()> {
    match command {
        LeadsCommand::List {
            status,
            agent,
            priority,
            source,
            tag,
        } => {
            let filters = LeadFilters {
                status,
                sales_agent: agent,
                priority,
                source,
                tags: tag,
            };
            let mut screen = LeadListScreen::new(filters);
            screen.load(client).await?;
            match format {
                OutputFormat::Table => print!("{}", render::render_lead_list(&screen, theme)),
                OutputFormat::Json => println!("{}", render::lead_list_json(&screen)?),
            }
        }

        LeadsCommand::Show { id } => {
            let mut screen = LeadDetailsScreen::new();
            screen.load(client, &id).await?;
            match format {
                OutputFormat::Table => print!("{}", render::render_lead_details(&screen, theme)),
                OutputFormat::Json => println!("{}", render::lead_details_json(&screen)?),
            }
        }

        LeadsCommand::Create {
            name,
            source,
            agent,
            status,
            priority,
            tags,
            time_to_close,
        } => {
            let payload = models::LeadPayload {
                name,
                source,
                sales_agent: agent,
                status,
                tags,
                time_to_close: Some(time_to_close),
                priority,
            };
            let mut screen = LeadListScreen::default();
            let lead = screen.create(client, &payload).await?;
            println!("Created lead \"{}\" ({})", lead.name, lead.id);
        }

        LeadsCommand::Update {
            id,
            name,
            source,
            agent,
            status,
            priority,
            tags,
            time_to_close,
        } => {
            let current = client.get_lead(&id).await?;
            let payload = merge_lead_update(
                &current,
                name,
                source,
                agent,
                status,
                priority,
                tags,
                time_to_close,
            );
            let mut screen = LeadListScreen::default();
            let lead = screen.update(client, &id, &payload).await?;
            println!("Updated lead \"{}\" ({})", lead.name, lead.id);
        }

        LeadsCommand::Delete { id } => {
            let mut screen = LeadListScreen::default();
            screen.delete(client, &id).await?;
            println!("Deleted lead {}", id);
        }

        LeadsCommand::Comment { id, text } => {
            let mut screen = LeadDetailsScreen::new();
            screen.load(client, &id).await?;
            let comment = screen.submit_comment(client, &text).await?;
            println!("Comment added by {}", comment.author_name());
        }
    }

    Ok(())
}

async fn run_agents_command(
    command: AgentsCommand,
    client: &CrmClient,
    format: OutputFormat,
    theme: settings::Theme,
) -> Result<()> {
    match command {
        AgentsCommand::List => {
            let mut screen = AgentsScreen::new();
            screen.load(client).await?;
            match format {
                OutputFormat::Table => print!("{}", render::render_agents(&screen, theme)),
                OutputFormat::Json => println!("{}", render::agents_json(&screen)?),
            }
        }

        AgentsCommand::Add { name, email } => {
            let payload = NewAgent { name, email };
            let mut screen = AgentsScreen::new();
            let agent = screen.add(client, &payload).await?;
            println!("Added agent \"{}\" ({})", agent.name, agent.id);
        }

        AgentsCommand::Remove { id } => {
            let mut screen = AgentsScreen::new();
            screen.load(client).await?;
            screen.remove(client, &id).await?;
            println!("Removed agent {}", id);
        }
    }

    Ok(())
}

/// Effective output format: CLI flag wins, then config file, then table.
fn output_format(args: &Args, config: &Config) -> OutputFormat {
    if let Some(format) = args.format {
        return format;
    }
    if config.general.format.eq_ignore_ascii_case("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    }
}
