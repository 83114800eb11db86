//! # alertsync
//!
//! Bulk alert-settings rollout for Cisco Meraki networks.
//!
//! alertsync applies one alert-settings document to many networks in an
//! organization, with the safety rails an operator wants before touching
//! production: dry-run, two confirmation gates, tag filtering, a pre-update
//! backup of every network, and a per-run audit log.
//!
//! ## Safety model
//!
//! - Nothing is mutated before the operator passes both confirmation gates
//!   (`yes` on the loaded settings, a literal `CONFIRM` on the target list).
//! - Each network is backed up before its settings are replaced; a failed
//!   backup skips that network.
//! - One network's failure never aborts the batch; every outcome is appended
//!   to the run log.
//!
//! ## Quick Start
//!
//! ```bash
//! # Walk through an interactive rollout
//! export MERAKI_DASHBOARD_API_KEY=...
//! alertsync apply --config alerts_config.json
//!
//! # Rehearse without touching anything
//! alertsync apply --config alerts_config.json --dry-run
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod runlog;
pub mod workflow;

pub use config::AppConfig;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::dashboard::{DashboardClient, Network, Organization, WebhookReceiver};
    pub use crate::error::{Error, Result};
    pub use crate::runlog::RunLogger;
    pub use crate::workflow::{execute, RunOptions, RunPlan, RunSummary, WebhookSpec};
}
