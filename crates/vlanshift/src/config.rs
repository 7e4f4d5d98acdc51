//! CLI configuration: thin wrapper around `vlanshift_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides and falls back
//! to interactive prompts for anything still missing.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use vlanshift_core::SessionConfig;

use crate::cli::{DiscoveryArgs, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use vlanshift_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile. An explicitly requested profile must exist; the
/// implicit default may be absent, in which case an empty one is used.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_none() => Ok((name, Profile::default())),
        None => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            })
        }
    }
}

/// Everything a network-walking command needs before its first connection.
#[derive(Debug)]
pub struct RunContext {
    pub profile_name: String,
    pub input: PathBuf,
    pub core: String,
    pub session: SessionConfig,
}

/// Resolve input file, core address and credentials.
///
/// Order per value: CLI flag (or its env var) > profile > defaults > prompt.
pub fn resolve_run_context(
    global: &GlobalOpts,
    discovery: &DiscoveryArgs,
) -> Result<RunContext, CliError> {
    let cfg = load_config()?;
    let (profile_name, profile) = active_profile(global, &cfg)?;

    let input = discovery
        .input
        .clone()
        .unwrap_or_else(|| cfg.defaults.input.clone());

    // Same order as the interactive tool: credentials first, then the core.
    let username = match global
        .username
        .clone()
        .or_else(|| vlanshift_config::resolve_username(&profile))
    {
        Some(user) => user,
        None => util::prompt_text("Username", None, "username", "--username")?,
    };
    let password = match vlanshift_config::resolve_password(&profile, &profile_name) {
        Some(secret) => secret,
        None => prompt_password()?,
    };

    let core = match discovery.core.clone().or_else(|| profile.core.clone()) {
        Some(core) => core,
        None => util::prompt_text("Core switch address", None, "core switch address", "--core")?,
    };

    let mut session =
        vlanshift_config::profile_session_config(&profile, &cfg.defaults, username, password)?;
    if let Some(port) = global.port {
        session.port = port;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs.max(1));
    }

    Ok(RunContext {
        profile_name,
        input,
        core,
        session,
    })
}

fn prompt_password() -> Result<SecretString, CliError> {
    if !util::is_interactive() {
        return Err(CliError::MissingValue {
            what: "password".into(),
            flag: "VLANSHIFT_PASSWORD".into(),
        });
    }
    let pass = rpassword::prompt_password("Password: ")?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pass))
}
