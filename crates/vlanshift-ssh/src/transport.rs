// Shared transport configuration for building SSH client sessions.
//
// Every session in a run shares the port, timeout and terminal settings
// through this module, avoiding duplicated builder logic.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use russh::client;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Shared transport configuration for opening switch sessions.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub port: u16,
    /// Bound on connect, authentication, and each command exchange.
    pub timeout: Duration,
    /// Pseudo-terminal width. Wide enough that IOS never wraps table rows.
    pub term_width: u32,
    /// When set, each session writes a transcript to `<dir>/session-<host>.log`.
    pub session_log_dir: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(30),
            term_width: 511,
            session_log_dir: None,
        }
    }
}

impl TransportConfig {
    /// Build the `russh` client configuration.
    pub fn client_config(&self) -> Arc<client::Config> {
        Arc::new(client::Config {
            inactivity_timeout: Some(self.timeout.saturating_mul(4)),
            ..client::Config::default()
        })
    }

    /// Path of the session transcript for `host`, if logging is enabled.
    pub fn session_log_path(&self, host: &str) -> Option<PathBuf> {
        let dir = self.session_log_dir.as_ref()?;
        let safe: String = host
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        Some(dir.join(format!("session-{safe}.log")))
    }

    /// Return a copy that logs session transcripts into `dir`.
    pub fn with_session_log(mut self, dir: PathBuf) -> Self {
        self.session_log_dir = Some(dir);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_log_path_disabled_by_default() {
        assert!(TransportConfig::default().session_log_path("10.0.0.5").is_none());
    }

    #[test]
    fn session_log_path_sanitizes_host() {
        let cfg = TransportConfig::default().with_session_log(PathBuf::from("/tmp/logs"));
        assert_eq!(
            cfg.session_log_path("fe80::1"),
            Some(PathBuf::from("/tmp/logs/session-fe80__1.log"))
        );
        assert_eq!(
            cfg.session_log_path("10.0.0.5"),
            Some(PathBuf::from("/tmp/logs/session-10.0.0.5.log"))
        );
    }
}
