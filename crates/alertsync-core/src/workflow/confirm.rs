//! Confirmation gates and dry-run mode
//!
//! Two independent checkpoints stand between the operator and any mutation:
//! acceptance of the loaded settings (`yes`, any case) and a final literal
//! `CONFIRM` (case-sensitive) after the target list is shown. Declining either
//! ends the run with nothing changed.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use serde_json::Value;

use crate::dashboard::Network;
use crate::error::Result;

/// Literal token required at the final checkpoint
pub const FINAL_TOKEN: &str = "CONFIRM";

/// Initial acceptance answer: `yes` in any case, surrounding whitespace ignored
pub fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

/// Final checkpoint token: exact match after trimming
pub fn is_final_token(input: &str) -> bool {
    input.trim() == FINAL_TOKEN
}

/// Ask whether to run in dry-run mode
pub fn prompt_dry_run() -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Enable dry-run mode (no changes applied)?")
        .default(false)
        .interact()?)
}

/// Show the loaded settings document and ask for initial acceptance
pub fn confirm_settings(document: &Value) -> Result<bool> {
    println!("\n{}", style("Loaded alert settings:").bold());
    println!("{}", serde_json::to_string_pretty(document)?);

    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Proceed with these alert settings? (yes/no)")
        .allow_empty(true)
        .interact_text()?;

    Ok(is_affirmative(&answer))
}

/// Show the final target list and require the literal confirmation token
pub fn confirm_final(networks: &[Network]) -> Result<bool> {
    println!("\n{}", style("FINAL CHECK").red().bold());
    println!("About to apply changes to the following networks:");
    for net in networks {
        println!("- {} (ID: {})", net.name, net.id);
    }

    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Type '{FINAL_TOKEN}' to continue"))
        .allow_empty(true)
        .interact_text()?;

    Ok(is_final_token(&answer))
}
