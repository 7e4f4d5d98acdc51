//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vlanshift_config::ConfigError;
use vlanshift_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const EXPORT: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {address}")]
    #[diagnostic(
        code(vlanshift::connection_failed),
        help(
            "{reason}\n\
             Check that the switch is reachable over SSH and the port is correct (--port)."
        )
    )]
    ConnectionFailed { address: String, reason: String },

    #[error("{address} did not respond within {seconds}s")]
    #[diagnostic(
        code(vlanshift::timeout),
        help("Increase the timeout with --timeout or check the switch's load.")
    )]
    Timeout { address: String, seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed on {address}")]
    #[diagnostic(
        code(vlanshift::auth_failed),
        help(
            "{message}\n\
             The same account is used on every switch; verify it on the core first.\n\
             Run: vlanshift config set-password"
        )
    )]
    AuthFailed { address: String, message: String },

    // ── Device commands ──────────────────────────────────────────────
    #[error("'{command}' failed on {address}: {message}")]
    #[diagnostic(code(vlanshift::command_failed))]
    CommandFailed {
        address: String,
        command: String,
        message: String,
    },

    #[error("Unexpected output from '{command}': {message}")]
    #[diagnostic(
        code(vlanshift::unexpected_output),
        help("Run with -vvv to see the raw device output.")
    )]
    UnexpectedOutput { command: String, message: String },

    // ── Input / validation ───────────────────────────────────────────
    #[error("Cannot read MAC list {path}")]
    #[diagnostic(
        code(vlanshift::input),
        help("{reason}\nPass a different file with --input (-i).")
    )]
    Input { path: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vlanshift::validation))]
    Validation { field: String, reason: String },

    #[error("No {what} given and no terminal to ask for it")]
    #[diagnostic(
        code(vlanshift::non_interactive),
        help("Pass {flag} or add it to your profile with: vlanshift config init")
    )]
    MissingValue { what: String, flag: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vlanshift::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vlanshift config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(vlanshift::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(vlanshift::keyring),
        help("Store the password in the profile or VLANSHIFT_PASSWORD instead.")
    )]
    Keyring(String),

    // ── Export ───────────────────────────────────────────────────────
    #[error("Cannot write results to {path}")]
    #[diagnostic(code(vlanshift::export), help("{reason}"))]
    Export { path: String, reason: String },

    // ── IO / internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(vlanshift::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Input { .. } | Self::Validation { .. } | Self::MissingValue { .. } => {
                exit_code::USAGE
            }
            Self::Export { .. } => exit_code::EXPORT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAddress(e) => CliError::Validation {
                field: "MAC address".into(),
                reason: e.to_string(),
            },
            CoreError::Input { path, reason } => CliError::Input {
                path: path.display().to_string(),
                reason,
            },
            CoreError::AuthenticationFailed { address, message } => {
                CliError::AuthFailed { address, message }
            }
            CoreError::ConnectionFailed { address, reason } => {
                CliError::ConnectionFailed { address, reason }
            }
            CoreError::Timeout {
                address,
                timeout_secs,
            } => CliError::Timeout {
                address,
                seconds: timeout_secs,
            },
            CoreError::CommandFailed {
                address,
                command,
                message,
            } => CliError::CommandFailed {
                address,
                command,
                message,
            },
            CoreError::Schema { command, message } => {
                CliError::UnexpectedOutput { command, message }
            }
            CoreError::Export { path, reason } => CliError::Export {
                path: path.display().to_string(),
                reason,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Keyring(e) => CliError::Keyring(e.to_string()),
            ConfigError::Serialization(e) => CliError::Internal(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn session_errors_keep_distinct_exit_codes() {
        let auth: CliError = CoreError::AuthenticationFailed {
            address: "10.0.0.1".into(),
            message: "rejected".into(),
        }
        .into();
        let conn: CliError = CoreError::ConnectionFailed {
            address: "10.0.0.1".into(),
            reason: "refused".into(),
        }
        .into();
        let timeout: CliError = CoreError::Timeout {
            address: "10.0.0.1".into(),
            timeout_secs: 30,
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn export_failure_has_own_exit_code() {
        let err: CliError = CoreError::Export {
            path: "out/results.csv".into(),
            reason: "No such file or directory".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::EXPORT);
        assert_ne!(exit_code::SUCCESS, err.exit_code());
    }
}
