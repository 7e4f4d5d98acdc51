use thiserror::Error;

/// Top-level error type for the `vlanshift-ssh` crate.
///
/// Covers every failure mode of a switch session: authentication,
/// transport, command rejection, and output parsing.
/// `vlanshift-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The device rejected the username/password pair.
    #[error("Authentication failed for {address}: {message}")]
    Authentication { address: String, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// TCP connect or SSH handshake failed.
    #[error("Cannot connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    /// The SSH channel closed before the device returned a prompt.
    #[error("Session to {address} closed unexpectedly")]
    ChannelClosed { address: String },

    /// No prompt was seen within the configured timeout.
    #[error("Timed out after {timeout_secs}s waiting for {address}")]
    Timeout { address: String, timeout_secs: u64 },

    /// Low-level SSH protocol error.
    #[error("SSH protocol error: {0}")]
    Ssh(#[from] russh::Error),

    // ── Commands ────────────────────────────────────────────────────
    /// The device answered a command with one of its error markers.
    #[error("Command '{command}' rejected by {address}: {message}")]
    Command {
        address: String,
        command: String,
        message: String,
    },

    /// No output schema is registered for the command.
    #[error("No output schema for command '{command}'")]
    NoSchema { command: String },

    // ── Session log ─────────────────────────────────────────────────
    /// Failed to write the session transcript.
    #[error("Session log error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if the credentials were rejected.
    ///
    /// Credentials apply to the whole run, so this is never worth retrying.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
