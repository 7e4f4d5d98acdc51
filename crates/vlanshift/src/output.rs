//! Output formatting: table, JSON, YAML, plain.
//!
//! Results go to stdout in the format selected by `--output`. Progress and
//! diagnostics go to stderr through [`Reporter`], so piping a JSON result
//! never mixes in status lines.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use vlanshift_core::{LocatedDevice, RemediationState};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list in the chosen format.
///
/// `plain` calls `id_fn` on each item to emit one identifier per line.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single item; table mode uses a pre-formatted `detail_fn`.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table | OutputFormat::Plain => detail_fn(data),
        OutputFormat::Json => render_json(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(data).map_err(|e| CliError::Internal(e.to_string()))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Internal(e.to_string()))
}

// ── Device views ─────────────────────────────────────────────────────

/// One located device with its remediation state, for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct DeviceView {
    #[tabled(rename = "Device")]
    pub device: String,
    #[tabled(rename = "Switch")]
    pub switch_hostname: String,
    #[tabled(rename = "Switch IP")]
    pub switch_ip: String,
    #[tabled(rename = "Port")]
    pub switchport: String,
    #[tabled(rename = "VLAN")]
    pub current_vlan: u16,
    #[tabled(rename = "State")]
    pub state: RemediationState,
}

impl DeviceView {
    pub fn new(device: &LocatedDevice, state: RemediationState) -> Self {
        Self {
            device: device.mac.to_string(),
            switch_hostname: device.switch_hostname.clone(),
            switch_ip: device.switch_address.to_string(),
            switchport: device.interface.to_string(),
            current_vlan: device.current_vlan.get(),
            state,
        }
    }
}

/// Render located devices with their states in `format`.
pub fn render_devices(
    format: OutputFormat,
    located: &[LocatedDevice],
    states: &[RemediationState],
) -> Result<String, CliError> {
    let views: Vec<DeviceView> = located
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let state = states.get(i).copied().unwrap_or(RemediationState::Discovered);
            DeviceView::new(d, state)
        })
        .collect();
    render_list(format, &views, DeviceView::clone, |v| v.device.clone())
}

// ── Progress reporting ──────────────────────────────────────────────

/// Operator-facing status lines on stderr.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
    quiet: bool,
}

impl Reporter {
    pub fn new(color: ColorMode, quiet: bool) -> Self {
        Self {
            color: should_color(color),
            quiet,
        }
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn step(&self, msg: impl std::fmt::Display) {
        if !self.quiet {
            eprintln!("{msg}");
        }
    }

    pub fn success(&self, msg: impl std::fmt::Display) {
        if self.quiet {
            return;
        }
        if self.color {
            eprintln!("{} {msg}", "✓".green());
        } else {
            eprintln!("✓ {msg}");
        }
    }

    /// Always shown, even in quiet mode.
    pub fn warn(&self, msg: impl std::fmt::Display) {
        if self.color {
            eprintln!("{} {msg}", "!".yellow().bold());
        } else {
            eprintln!("! {msg}");
        }
    }

    /// Indented list item under the previous line.
    pub fn item(&self, msg: impl std::fmt::Display) {
        if !self.quiet {
            eprintln!("    {msg}");
        }
    }

    pub fn rule(&self) {
        if self.quiet {
            return;
        }
        let line = "─".repeat(72);
        if self.color {
            eprintln!("{}", line.dimmed());
        } else {
            eprintln!("{line}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vlanshift_core::{InterfaceName, VlanId, normalize};

    fn located() -> Vec<LocatedDevice> {
        vec![LocatedDevice {
            mac: normalize("00:1a:2b:3c:4d:5e").unwrap(),
            switch_address: "10.0.0.5".parse().unwrap(),
            switch_hostname: "acc-sw01".into(),
            interface: InterfaceName::new("Gi1/0/7"),
            current_vlan: VlanId::new(20).unwrap(),
        }]
    }

    #[test]
    fn plain_output_lists_macs() {
        let out = render_devices(OutputFormat::Plain, &located(), &[]).unwrap();
        assert_eq!(out, "001a.2b3c.4d5e");
    }

    #[test]
    fn json_output_includes_state() {
        let out = render_devices(
            OutputFormat::Json,
            &located(),
            &[RemediationState::Applied],
        )
        .unwrap();
        insta::assert_snapshot!(out, @r#"
        [
          {
            "device": "001a.2b3c.4d5e",
            "switch_hostname": "acc-sw01",
            "switch_ip": "10.0.0.5",
            "switchport": "Gi1/0/7",
            "current_vlan": 20,
            "state": "applied"
          }
        ]
        "#);
    }

    #[test]
    fn table_output_has_headers() {
        let out = render_devices(OutputFormat::Table, &located(), &[]).unwrap();
        assert!(out.contains("Switch IP"));
        assert!(out.contains("discovered"));
    }
}
