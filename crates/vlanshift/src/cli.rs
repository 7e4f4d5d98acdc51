//! Clap derive structures for the `vlanshift` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! crate-internal imports so `build.rs` can compile it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vlanshift -- find end devices by MAC address and move their access VLAN
#[derive(Debug, Parser)]
#[command(
    name = "vlanshift",
    version,
    about = "Locate end devices by MAC address and reassign their access VLAN",
    long_about = "Locate end devices by MAC address across Cisco switches and reassign their access VLAN.\n\n\
        Reads the core switch's MAC address table, follows port-channels and CDP\n\
        neighbors to the access switches, confirms each MAC on its access port,\n\
        and then pushes `switchport access vlan` changes with one SSH session\n\
        and one `write memory` per switch.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Network profile to use
    #[arg(long, short = 'p', env = "VLANSHIFT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Username for every switch (overrides profile)
    #[arg(long, short = 'u', env = "VLANSHIFT_USERNAME", global = true)]
    pub username: Option<String>,

    /// SSH port (overrides profile)
    #[arg(long, env = "VLANSHIFT_PORT", global = true)]
    pub port: Option<u16>,

    /// Connect and per-command timeout in seconds
    #[arg(long, env = "VLANSHIFT_TIMEOUT", global = true,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(
        long,
        short = 'o',
        env = "VLANSHIFT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one MAC per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Locate devices and move them to a new access VLAN
    Run(RunArgs),

    /// Locate devices without changing anything
    #[command(alias = "find")]
    Locate(LocateArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Discovery ────────────────────────────────────────────────────────

/// Arguments shared by every command that walks the network.
#[derive(Debug, Args)]
pub struct DiscoveryArgs {
    /// File with one MAC address per line
    #[arg(long, short = 'i', env = "VLANSHIFT_INPUT")]
    pub input: Option<PathBuf>,

    /// Core switch address (overrides profile)
    #[arg(long, env = "VLANSHIFT_CORE")]
    pub core: Option<String>,
}

#[derive(Debug, Args)]
pub struct LocateArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Access VLAN to assign (still confirmed unless --yes)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=4094))]
    pub vlan: Option<u16>,

    /// Results file name; `.csv` is appended when missing
    #[arg(long)]
    pub output_file: Option<String>,

    /// Answer yes to the proceed and VLAN confirmations
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show the change plan without touching any switch configuration
    #[arg(long)]
    pub dry_run: bool,

    /// Write an SSH transcript per target switch into this directory
    #[arg(long, value_name = "DIR")]
    pub session_log: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
