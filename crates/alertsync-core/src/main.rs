//! alertsync CLI
//!
//! Interactive operator tool that rolls one alert-settings document out to
//! many Meraki networks.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use alertsync::dashboard::DashboardClient;
use alertsync::workflow::{self, ApplyOverrides};
use alertsync::AppConfig;

/// alertsync - Bulk alert-settings rollout for Meraki networks
#[derive(Parser)]
#[command(name = "alertsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an alert-settings document to selected networks interactively
    Apply {
        /// Alert settings JSON file (prompted for when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulate the run without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Pre-answer the tag filter prompt
        #[arg(long, conflicts_with = "no_tag_filter")]
        tag: Option<String>,

        /// Skip the tag-filter step entirely
        #[arg(long)]
        no_tag_filter: bool,

        /// Skip pre-update backups
        #[arg(long)]
        no_backup: bool,

        /// Skip the webhook step entirely
        #[arg(long)]
        no_webhook: bool,

        /// Root directory for backups (default from configuration)
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// List organizations visible to the API key
    Orgs,

    /// List networks in an organization
    Networks {
        /// Organization ID
        #[arg(long)]
        org: String,

        /// Only show networks carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // .env may carry MERAKI_DASHBOARD_API_KEY
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout belongs to prompts and results
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match AppConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Apply {
            config: settings,
            dry_run,
            tag,
            no_tag_filter,
            no_backup,
            no_webhook,
            backup_dir,
        } => {
            run_apply(
                &config,
                ApplyOverrides {
                    settings_path: settings,
                    dry_run,
                    tag,
                    tag_filter_enabled: !no_tag_filter,
                    backup_enabled: !no_backup,
                    webhook_enabled: !no_webhook,
                    backup_dir,
                },
            )
            .await
        }
        Commands::Orgs => run_orgs(&config).await,
        Commands::Networks { org, tag } => run_networks(&config, &org, tag.as_deref()).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_apply(config: &AppConfig, overrides: ApplyOverrides) -> anyhow::Result<()> {
    // An operator abort and a completed batch both exit 0; per-network
    // failures are reported in the summary and the run log.
    workflow::run_interactive(config, overrides).await?;
    Ok(())
}

async fn run_orgs(config: &AppConfig) -> anyhow::Result<()> {
    let client = client_from_env(config)?;
    let orgs = client.organizations().await?;

    if orgs.is_empty() {
        println!("No organizations are visible to this API key.");
        return Ok(());
    }
    workflow::print_organizations(&orgs);
    Ok(())
}

async fn run_networks(config: &AppConfig, org_id: &str, tag: Option<&str>) -> anyhow::Result<()> {
    let client = client_from_env(config)?;
    let mut networks = client.organization_networks(org_id).await?;

    if let Some(tag) = tag {
        networks = workflow::filter_by_tag(&networks, tag);
    }
    if networks.is_empty() {
        println!("No matching networks.");
        return Ok(());
    }
    workflow::print_networks(&networks);
    Ok(())
}

fn client_from_env(config: &AppConfig) -> anyhow::Result<DashboardClient> {
    let api_key = workflow::resolve_api_key()?;
    Ok(DashboardClient::new(&api_key, &config.api)?)
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "alertsync", &mut io::stdout());
}
