//! Shared helpers for command handlers: prompts and progress.

use std::io::IsTerminal;
use std::time::Duration;

use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;

/// Whether stdin is a terminal the operator can answer from.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !is_interactive() {
        return Err(CliError::MissingValue {
            what: "confirmation".into(),
            flag: "--yes".into(),
        });
    }
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Ask for a non-empty line of text. `what`/`flag` name the value in the
/// error raised when there is no terminal.
pub fn prompt_text(
    prompt: &str,
    default: Option<&str>,
    what: &str,
    flag: &str,
) -> Result<String, CliError> {
    if !is_interactive() {
        return Err(CliError::MissingValue {
            what: what.into(),
            flag: flag.into(),
        });
    }
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default) = default {
        input = input.default(default.to_owned());
    }
    let value = input.interact_text().map_err(prompt_err)?;
    let value = value.trim().to_owned();
    if value.is_empty() {
        return Err(CliError::Validation {
            field: what.into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(value)
}

/// Ask for a VLAN ID until the answer is valid.
pub fn prompt_vlan() -> Result<vlanshift_core::VlanId, CliError> {
    if !is_interactive() {
        return Err(CliError::MissingValue {
            what: "VLAN".into(),
            flag: "--vlan".into(),
        });
    }
    Input::<String>::new()
        .with_prompt("VLAN to assign to these devices")
        .validate_with(|v: &String| v.parse::<vlanshift_core::VlanId>().map(drop))
        .interact_text()
        .map_err(prompt_err)?
        .parse()
        .map_err(|e: vlanshift_core::InvalidVlan| CliError::Validation {
            field: "vlan".into(),
            reason: e.to_string(),
        })
}

// ── Progress ────────────────────────────────────────────────────────

/// Spinner on stderr; hidden in quiet mode and when stderr is not a TTY.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁"]);
    pb.set_style(style);
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
