// ── Runtime session configuration ──
//
// These types describe *how* to reach the switches of one run. They carry
// credential data and connection tuning, but never touch disk. The CLI
// constructs a `SessionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use vlanshift_ssh::{Credentials, TransportConfig};

/// Configuration shared by every device session of a run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Username used on every device.
    pub username: String,
    /// Password used on every device.
    pub password: SecretString,
    /// SSH port.
    pub port: u16,
    /// Bound on connecting and on each command exchange.
    pub timeout: Duration,
    /// Directory for per-device session transcripts, if any.
    pub session_log_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            port: vlanshift_ssh::transport::DEFAULT_PORT,
            timeout: Duration::from_secs(30),
            session_log_dir: None,
        }
    }

    pub(crate) fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            port: self.port,
            timeout: self.timeout,
            session_log_dir: self.session_log_dir.clone(),
            ..TransportConfig::default()
        }
    }
}
