//! Shared helpers for command handlers.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use ddiq_core::{CallPreview, Confirm, Decision};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Terminal yes/no prompt in front of each WAPI call (`--confirm`).
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, preview: &CallPreview) -> Decision {
        eprintln!("→ {}", preview.request_line());
        eprintln!("  {}", preview.description);
        match dialoguer::Confirm::new()
            .with_prompt("Send this request?")
            .default(true)
            .interact()
        {
            Ok(true) => Decision::Approve,
            Ok(false) => Decision::Deny,
            Err(e) => {
                warn!(error = %e, "confirmation prompt unavailable, declining call");
                Decision::Deny
            }
        }
    }
}

/// Spinner on stderr while a lookup runs. Hidden when quiet or when
/// confirmation prompts share the terminal.
pub fn spinner(global: &GlobalOpts, message: String) -> ProgressBar {
    if global.quiet || global.confirm {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
