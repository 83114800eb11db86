//! Bulk alert-settings rollout workflow
//!
//! Split in two layers: an interactive driver ([`run_interactive`]) that walks
//! the operator through selection and confirmation to produce a [`RunPlan`],
//! and an engine ([`execute`]) that applies the plan network by network. The
//! engine never prompts, so it can be driven end to end in tests.

mod backup;
mod confirm;
mod select;
mod webhook;

pub use backup::{backup_filename, backup_network};
pub use confirm::{
    confirm_final, confirm_settings, is_affirmative, is_final_token, prompt_dry_run, FINAL_TOKEN,
};
pub use select::{
    choose_networks, choose_organization, filter_by_tag, parse_selection, print_networks,
    print_organizations, prompt_tag_filter,
};
pub use webhook::{
    ensure_webhook, generate_secret, link_webhook_destination, prompt_webhook_spec,
    ProvisionedWebhook, WebhookSpec, GENERATED_SECRET_LEN,
};

use std::path::{Path, PathBuf};

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::info;

use crate::config::{load_alert_document, AppConfig};
use crate::dashboard::{DashboardClient, Network, API_KEY_ENV};
use crate::error::{Error, Result};
use crate::runlog::{run_stamp, RunLogger};

/// Feature switches and session values for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Replace every mutating step with a logged simulation
    pub dry_run: bool,

    /// Snapshot each network's settings before updating it
    pub backup_enabled: bool,

    /// Webhook to provision on each network, if any
    pub webhook: Option<WebhookSpec>,

    /// Directory this run's backups are written into
    pub backup_dir: PathBuf,
}

/// Everything the engine needs to apply a run
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Networks to update, in operator-selected order
    pub networks: Vec<Network>,

    /// Alert settings applied identically to every network
    pub settings: Value,

    /// Feature switches and session values
    pub options: RunOptions,
}

/// Result of one step of the per-network sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step ran and succeeded
    Ok,
    /// Step did not apply to this run or was never reached
    Skipped,
    /// Step failed with the given message
    Failed(String),
}

impl StepOutcome {
    /// Whether this step failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Terminal status of one network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Dry run, nothing touched
    Simulated,
    /// Settings replaced
    Updated,
    /// An earlier step failed, the update was never attempted
    Skipped,
    /// The update itself failed
    Failed,
}

/// Record of what happened to one network
#[derive(Debug, Clone)]
pub struct NetworkOutcome {
    /// The network this outcome belongs to
    pub network: Network,

    /// Webhook provisioning step
    pub webhook: StepOutcome,

    /// Settings backup step
    pub backup: StepOutcome,

    /// Settings update step
    pub update: StepOutcome,

    /// Where the backup landed, when one was taken
    pub backup_path: Option<PathBuf>,

    /// Terminal status
    pub status: NetworkStatus,
}

/// Aggregated results of a completed batch
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Per-network outcomes in batch order
    pub outcomes: Vec<NetworkOutcome>,
}

impl RunSummary {
    /// Networks whose settings were replaced
    pub fn updated(&self) -> usize {
        self.count(NetworkStatus::Updated)
    }

    /// Networks simulated under dry-run
    pub fn simulated(&self) -> usize {
        self.count(NetworkStatus::Simulated)
    }

    /// Networks skipped after a webhook or backup failure
    pub fn skipped(&self) -> usize {
        self.count(NetworkStatus::Skipped)
    }

    /// Networks whose update call failed
    pub fn failed(&self) -> usize {
        self.count(NetworkStatus::Failed)
    }

    fn count(&self, status: NetworkStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// How an interactive run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Operator declined one of the confirmation gates
    Aborted,
    /// The batch ran; per-network results inside
    Completed(RunSummary),
}

/// Apply a prepared plan network by network.
///
/// Order is exactly the plan's order and one network's failure never stops
/// the batch. Every status line lands in the run log as it happens.
pub async fn execute(client: &DashboardClient, plan: &RunPlan, logger: &RunLogger) -> RunSummary {
    let progress = ProgressBar::new(plan.networks.len() as u64).with_style(progress_style());

    let mut summary = RunSummary::default();
    for network in &plan.networks {
        progress.set_message(network.name.clone());
        let outcome = apply_network(client, network, plan, logger, &progress).await;
        summary.outcomes.push(outcome);
        progress.inc(1);
    }
    progress.finish_and_clear();

    summary
}

async fn apply_network(
    client: &DashboardClient,
    network: &Network,
    plan: &RunPlan,
    logger: &RunLogger,
    progress: &ProgressBar,
) -> NetworkOutcome {
    progress.suspend(|| {
        println!(
            "\n{} {} (ID: {})",
            style("Processing:").bold(),
            network.name,
            network.id
        );
    });

    let options = &plan.options;
    let mut outcome = NetworkOutcome {
        network: network.clone(),
        webhook: StepOutcome::Skipped,
        backup: StepOutcome::Skipped,
        update: StepOutcome::Skipped,
        backup_path: None,
        status: NetworkStatus::Skipped,
    };

    if options.dry_run {
        let actions = dry_run_actions(options.webhook.is_some(), options.backup_enabled);
        report(
            progress,
            logger,
            &format!("DRY RUN: Would {actions} for '{}'", network.name),
            Tone::Note,
        );
        outcome.status = NetworkStatus::Simulated;
        return outcome;
    }

    // An alert policy referencing a receiver that was never provisioned would
    // silently drop notifications, so a webhook failure skips the network.
    let mut linked_receiver = None;
    if let Some(spec) = &options.webhook {
        match ensure_webhook(client, &network.id, spec).await {
            Ok(provisioned) => {
                outcome.webhook = StepOutcome::Ok;
                let receiver = provisioned.receiver();
                let line = match &provisioned {
                    ProvisionedWebhook::Reused(_) => format!(
                        "Reusing webhook receiver '{}' (ID: {}) for {}",
                        receiver.name, receiver.id, network.name
                    ),
                    ProvisionedWebhook::Created(_) => format!(
                        "Created webhook receiver '{}' (ID: {}) for {}",
                        receiver.name, receiver.id, network.name
                    ),
                };
                report(progress, logger, &line, Tone::Good);
                if spec.link_as_destination {
                    linked_receiver = Some(receiver.id.clone());
                }
            }
            Err(e) => {
                outcome.webhook = StepOutcome::Failed(e.to_string());
                report(
                    progress,
                    logger,
                    &format!(
                        "Skipped updating alerts for {} due to webhook failure: {e}",
                        network.name
                    ),
                    Tone::Bad,
                );
                return outcome;
            }
        }
    }

    // No overwrite without a snapshot.
    if options.backup_enabled {
        match backup_network(client, network, &options.backup_dir).await {
            Ok(path) => {
                outcome.backup = StepOutcome::Ok;
                report(
                    progress,
                    logger,
                    &format!(
                        "Backed up alert settings for {} to {}",
                        network.name,
                        path.display()
                    ),
                    Tone::Good,
                );
                outcome.backup_path = Some(path);
            }
            Err(e) => {
                outcome.backup = StepOutcome::Failed(e.to_string());
                report(
                    progress,
                    logger,
                    &format!(
                        "Skipped updating alerts for {} due to backup failure: {e}",
                        network.name
                    ),
                    Tone::Bad,
                );
                return outcome;
            }
        }
    }

    let settings = match &linked_receiver {
        Some(receiver_id) => link_webhook_destination(&plan.settings, receiver_id),
        None => plan.settings.clone(),
    };

    match client.update_alert_settings(&network.id, &settings).await {
        Ok(_) => {
            outcome.update = StepOutcome::Ok;
            outcome.status = NetworkStatus::Updated;
            report(
                progress,
                logger,
                &format!("Updated alerts for {}", network.name),
                Tone::Good,
            );
        }
        Err(e) => {
            outcome.update = StepOutcome::Failed(e.to_string());
            outcome.status = NetworkStatus::Failed;
            report(
                progress,
                logger,
                &format!("Failed to update alerts for {}: {e}", network.name),
                Tone::Bad,
            );
        }
    }

    outcome
}

fn dry_run_actions(webhook: bool, backup: bool) -> &'static str {
    match (webhook, backup) {
        (true, true) => "create webhook, back up and update alerts",
        (true, false) => "create webhook and update alerts",
        (false, true) => "back up and update alerts",
        (false, false) => "update alerts",
    }
}

enum Tone {
    Good,
    Bad,
    Note,
}

/// Print a status line under the progress bar and append it to the run log
fn report(progress: &ProgressBar, logger: &RunLogger, line: &str, tone: Tone) {
    progress.suspend(|| match tone {
        Tone::Good => println!("{} {line}", style("✔").green()),
        Tone::Bad => println!("{} {line}", style("✘").red()),
        Tone::Note => println!("{} {line}", style("•").yellow()),
    });
    logger.log_best_effort(line);
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("[{pos}/{len}] {bar:30.cyan/blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Command-line overrides for the interactive apply flow
#[derive(Debug, Clone)]
pub struct ApplyOverrides {
    /// Alert settings file given on the command line instead of prompted
    pub settings_path: Option<PathBuf>,

    /// Dry-run forced on without prompting
    pub dry_run: bool,

    /// Tag filter given on the command line instead of prompted
    pub tag: Option<String>,

    /// Whether the tag-filter step runs at all
    pub tag_filter_enabled: bool,

    /// Whether per-network backups are taken
    pub backup_enabled: bool,

    /// Whether the webhook step is offered
    pub webhook_enabled: bool,

    /// Backup root directory override
    pub backup_dir: Option<PathBuf>,
}

impl Default for ApplyOverrides {
    fn default() -> Self {
        Self {
            settings_path: None,
            dry_run: false,
            tag: None,
            tag_filter_enabled: true,
            backup_enabled: true,
            webhook_enabled: true,
            backup_dir: None,
        }
    }
}

/// Read the Dashboard API key from the environment, prompting if unset.
///
/// The prompt hides input; keys never land in shell history or scrollback.
pub fn resolve_api_key() -> Result<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            info!("using API key from {API_KEY_ENV}");
            return Ok(key);
        }
    }

    let key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Meraki Dashboard API key")
        .interact()?;

    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(Error::auth("an API key is required"));
    }
    Ok(key)
}

/// Walk the operator through a full apply run.
///
/// Pre-flight failures (unreadable settings file, bad selection, empty tag
/// match) return an error before anything is mutated. A declined confirmation
/// gate is not an error; it ends the run as [`RunOutcome::Aborted`].
pub async fn run_interactive(config: &AppConfig, overrides: ApplyOverrides) -> Result<RunOutcome> {
    let api_key = resolve_api_key()?;
    let client = DashboardClient::new(&api_key, &config.api)?;

    let settings_path = match overrides.settings_path {
        Some(path) => path,
        None => {
            let raw: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Path to alert settings JSON file (e.g. alerts_config.json)")
                .interact_text()?;
            PathBuf::from(raw.trim())
        }
    };

    let document = load_alert_document(&settings_path)?;

    let dry_run = overrides.dry_run || prompt_dry_run()?;

    if !confirm_settings(&document)? {
        println!("{}", style("Aborted.").yellow());
        return Ok(RunOutcome::Aborted);
    }

    let orgs = client.organizations().await?;
    let org = choose_organization(&orgs)?;
    info!(org_id = %org.id, org_name = %org.name, "organization selected");

    let mut networks = client.organization_networks(&org.id).await?;
    if networks.is_empty() {
        return Err(Error::selection(format!(
            "organization {} has no networks",
            org.name
        )));
    }

    if overrides.tag_filter_enabled {
        let tag = match overrides.tag {
            Some(tag) => tag,
            None => prompt_tag_filter()?,
        };

        if !tag.is_empty() {
            let filtered = filter_by_tag(&networks, &tag);
            if filtered.is_empty() {
                return Err(Error::selection(format!("no networks carry tag '{tag}'")));
            }
            println!(
                "{} of {} networks carry tag '{tag}'",
                filtered.len(),
                networks.len()
            );
            networks = filtered;
        }
    }

    let selected = choose_networks(&networks)?;

    let stamp = run_stamp();
    let logger = RunLogger::create(Path::new("."), &stamp, dry_run)?;
    println!("Logging to {}", logger.path().display());

    let webhook = if overrides.webhook_enabled {
        prompt_webhook_spec()?
    } else {
        None
    };

    if !confirm_final(&selected)? {
        println!("{}", style("Aborted at final validation step.").yellow());
        logger.log_best_effort("Aborted by operator at final validation step");
        return Ok(RunOutcome::Aborted);
    }

    let backup_root = overrides
        .backup_dir
        .unwrap_or_else(|| PathBuf::from(&config.backup.root_dir));
    let options = RunOptions {
        dry_run,
        backup_enabled: overrides.backup_enabled,
        webhook,
        backup_dir: backup_root.join(&stamp),
    };

    let plan = RunPlan {
        networks: selected,
        settings: document,
        options,
    };

    let summary = execute(&client, &plan, &logger).await;
    print_summary(&summary, &logger, dry_run);

    Ok(RunOutcome::Completed(summary))
}

fn print_summary(summary: &RunSummary, logger: &RunLogger, dry_run: bool) {
    println!();
    if dry_run {
        println!(
            "{} {} network(s) simulated.",
            style("Dry run complete:").bold(),
            summary.simulated()
        );
    } else {
        println!(
            "{} {} updated, {} skipped, {} failed.",
            style("Run complete:").bold(),
            summary.updated(),
            summary.skipped(),
            summary.failed()
        );
    }
    println!("Log saved to: {}", logger.path().display());
}
