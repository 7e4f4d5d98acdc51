// ── Core error types ──
//
// User-facing errors from vlanshift-core. Consumers never see SSH protocol
// details directly; the `From<vlanshift_ssh::Error>` impl translates
// transport-layer errors into the run's error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::InvalidAddress;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input ────────────────────────────────────────────────────────
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),

    #[error("Cannot read MAC list {path}: {reason}")]
    Input { path: PathBuf, reason: String },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed on {address}: {message}")]
    AuthenticationFailed { address: String, message: String },

    #[error("Cannot connect to {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    #[error("{address} did not respond within {timeout_secs}s")]
    Timeout { address: String, timeout_secs: u64 },

    #[error("Command '{command}' failed on {address}: {message}")]
    CommandFailed {
        address: String,
        command: String,
        message: String,
    },

    #[error("Unexpected output from '{command}': {message}")]
    Schema { command: String, message: String },

    // ── Export ───────────────────────────────────────────────────────
    #[error("Cannot write results to {path}: {reason}")]
    Export { path: PathBuf, reason: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Credentials are shared by the whole run; nothing after this can succeed.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Errors that only affect one device and allow the run to continue with
    /// the next candidate or target switch.
    pub fn is_device_scoped(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::Timeout { .. }
                | Self::CommandFailed { .. }
                | Self::Schema { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vlanshift_ssh::Error> for CoreError {
    fn from(err: vlanshift_ssh::Error) -> Self {
        use vlanshift_ssh::Error as E;
        match err {
            E::Authentication { address, message } => {
                CoreError::AuthenticationFailed { address, message }
            }
            E::Connect { address, reason } => CoreError::ConnectionFailed { address, reason },
            E::ChannelClosed { address } => CoreError::ConnectionFailed {
                address,
                reason: "session closed by device".into(),
            },
            E::Timeout {
                address,
                timeout_secs,
            } => CoreError::Timeout {
                address,
                timeout_secs,
            },
            E::Ssh(e) => CoreError::ConnectionFailed {
                address: "<session>".into(),
                reason: e.to_string(),
            },
            E::Command {
                address,
                command,
                message,
            } => CoreError::CommandFailed {
                address,
                command,
                message,
            },
            E::NoSchema { command } => CoreError::Internal(format!(
                "no output schema registered for '{command}'"
            )),
            E::Io(e) => CoreError::Internal(format!("session log: {e}")),
        }
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Internal(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_errors_map_to_taxonomy() {
        let auth: CoreError = vlanshift_ssh::Error::Authentication {
            address: "10.0.0.1".into(),
            message: "rejected".into(),
        }
        .into();
        assert!(auth.is_authentication());
        assert!(!auth.is_device_scoped());

        let timeout: CoreError = vlanshift_ssh::Error::Timeout {
            address: "10.0.0.1".into(),
            timeout_secs: 30,
        }
        .into();
        assert!(timeout.is_device_scoped());

        let command: CoreError = vlanshift_ssh::Error::Command {
            address: "10.0.0.1".into(),
            command: "interface Gi9/9/9".into(),
            message: "% Invalid input".into(),
        }
        .into();
        assert!(matches!(command, CoreError::CommandFailed { .. }));
    }
}
