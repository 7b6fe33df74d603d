//! Configuration application logic.
//!
//! Desired settings are turned into commands and issued through the
//! dispatcher, so they are validated exactly like any other request.

use tracing::debug;

use super::types::{DesiredConfig, PlannedCommand};
use crate::ieee80211::dispatch::WlanInterface;
use crate::ieee80211::error::{Error, Outcome, Result};

/// Options for applying configuration.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Don't actually issue commands, just list what would be done.
    pub dry_run: bool,
    /// Continue with the remaining commands when one fails.
    pub continue_on_error: bool,
}

/// Result of applying configuration.
#[derive(Debug, Default)]
pub struct ApplyResult {
    /// Number of commands that succeeded (or would be issued in dry-run mode).
    pub changes_made: usize,
    /// At least one command asked for a network reset.
    pub reset_required: bool,
    /// Errors that occurred during application (when continue_on_error is true).
    pub errors: Vec<ApplyError>,
    /// Summary of what was done.
    pub summary: Vec<String>,
}

impl ApplyResult {
    /// Check if the application was fully successful.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get a human-readable summary.
    pub fn summary_text(&self) -> String {
        if self.summary.is_empty() {
            "No changes made".to_string()
        } else {
            self.summary.join("\n")
        }
    }
}

/// An error that occurred during configuration application.
#[derive(Debug)]
pub struct ApplyError {
    /// What operation was being performed.
    pub operation: String,
    /// The underlying error.
    pub error: Error,
}

impl std::fmt::Display for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.operation, self.error)
    }
}

/// Apply desired settings to an interface.
pub async fn apply_config(
    desired: &DesiredConfig,
    iface: &WlanInterface,
    options: ApplyOptions,
) -> Result<ApplyResult> {
    let plan = desired.plan()?;
    apply_plan(plan, iface, options).await
}

/// Issue pre-computed commands in order.
pub async fn apply_plan(
    plan: Vec<PlannedCommand>,
    iface: &WlanInterface,
    options: ApplyOptions,
) -> Result<ApplyResult> {
    let mut result = ApplyResult::default();

    for PlannedCommand {
        operation,
        command,
        mut payload,
    } in plan
    {
        if options.dry_run {
            result.summary.push(format!("Would {operation}"));
            result.changes_made += 1;
            continue;
        }

        match iface.ioctl(command, &mut payload).await {
            Ok(outcome) => {
                let note = match outcome {
                    Outcome::Applied => "",
                    Outcome::ResetRequired => " (reset required)",
                };
                result.summary.push(format!("Done: {operation}{note}"));
                result.reset_required |= outcome.is_reset();
                result.changes_made += 1;
            }
            Err(e) => {
                debug!(%command, error = %e, "apply step failed");
                if options.continue_on_error {
                    result.errors.push(ApplyError {
                        operation,
                        error: e,
                    });
                } else {
                    return Err(e);
                }
            }
        }
    }

    Ok(result)
}
