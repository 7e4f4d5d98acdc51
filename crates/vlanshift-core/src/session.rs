// ── Device session seam ──
//
// Pipeline stages talk to switches through `Connector` / `DeviceSession`
// rather than the SSH client directly. Typed table queries live here as
// provided methods, so the locator and remediator never touch `Row`s.

#![allow(async_fn_in_trait)]

use std::path::PathBuf;

use tracing::{debug, info, warn};
use vlanshift_ssh::{Credentials, Row, Schema, SshSession, TransportConfig};

use crate::config::SessionConfig;
use crate::convert;
use crate::error::CoreError;
use crate::model::{AggregatedPort, ForwardingEntry, NeighborRecord};

/// One authenticated command session on a device.
///
/// Sessions are opened by a [`Connector`] and must be finished with
/// [`close()`](Self::close) on every path, including errors.
pub trait DeviceSession {
    /// The address the session was opened against.
    fn address(&self) -> &str;

    /// Hostname reported by the device.
    fn hostname(&self) -> &str;

    /// Whether the session sits at the privileged (`#`) prompt, where
    /// configuration mode is available.
    fn is_privileged(&self) -> bool;

    /// Run a command with a known output schema and return its rows.
    async fn run_structured(&mut self, command: &str) -> Result<Vec<Row>, CoreError>;

    /// Push configuration lines in configuration mode.
    async fn apply_config(&mut self, lines: &[String]) -> Result<(), CoreError>;

    /// Save the running configuration.
    async fn persist(&mut self) -> Result<(), CoreError>;

    async fn close(self) -> Result<(), CoreError>
    where
        Self: Sized;

    // ── Typed queries ────────────────────────────────────────────────

    async fn forwarding_table(&mut self) -> Result<Vec<ForwardingEntry>, CoreError> {
        let rows = self.run_structured(Schema::MacAddressTable.command()).await?;
        Ok(convert::forwarding_table(&rows))
    }

    async fn aggregated_ports(&mut self) -> Result<Vec<AggregatedPort>, CoreError> {
        let rows = self
            .run_structured(Schema::EtherchannelSummary.command())
            .await?;
        convert::aggregated_ports(&rows)
    }

    async fn neighbors(&mut self) -> Result<Vec<NeighborRecord>, CoreError> {
        let rows = self
            .run_structured(Schema::CdpNeighborsDetail.command())
            .await?;
        Ok(convert::neighbor_table(&rows))
    }
}

/// Opens sessions to devices by address.
pub trait Connector {
    type Session: DeviceSession;

    async fn open(&self, address: &str) -> Result<Self::Session, CoreError>;
}

/// Close `session`, logging rather than returning a failure. Used once the
/// caller already holds the result that matters.
pub async fn finish<S: DeviceSession>(session: S) {
    let address = session.address().to_owned();
    if let Err(e) = session.close().await {
        warn!(%address, error = %e, "session did not close cleanly");
    }
}

// ── SSH implementation ───────────────────────────────────────────────

/// [`Connector`] backed by interactive SSH shells.
#[derive(Debug, Clone)]
pub struct SshConnector {
    credentials: Credentials,
    transport: TransportConfig,
}

impl SshConnector {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            credentials: config.credentials(),
            transport: config.transport(),
        }
    }

    /// Write per-device transcripts into `dir`.
    pub fn with_session_log(mut self, dir: PathBuf) -> Self {
        self.transport = self.transport.with_session_log(dir);
        self
    }
}

impl Connector for SshConnector {
    type Session = SshSession;

    async fn open(&self, address: &str) -> Result<SshSession, CoreError> {
        info!(address, "connecting");
        let session = SshSession::open(address, &self.credentials, &self.transport)
            .await
            .map_err(|e| {
                if e.is_authentication() {
                    warn!(address, "credentials rejected; they are shared by every switch");
                }
                session_error(address, e)
            })?;
        debug!(address, hostname = session.hostname(), "session ready");
        Ok(session)
    }
}

impl DeviceSession for SshSession {
    fn address(&self) -> &str {
        SshSession::address(self)
    }

    fn hostname(&self) -> &str {
        SshSession::hostname(self)
    }

    fn is_privileged(&self) -> bool {
        SshSession::is_privileged(self)
    }

    async fn run_structured(&mut self, command: &str) -> Result<Vec<Row>, CoreError> {
        let result = self.send_structured(command).await;
        result.map_err(|e| session_error(SshSession::address(self), e))
    }

    async fn apply_config(&mut self, lines: &[String]) -> Result<(), CoreError> {
        let result = self.send_config_set(lines).await;
        result
            .map(drop)
            .map_err(|e| session_error(SshSession::address(self), e))
    }

    async fn persist(&mut self) -> Result<(), CoreError> {
        let result = self.save_config().await;
        result
            .map(drop)
            .map_err(|e| session_error(SshSession::address(self), e))
    }

    async fn close(self) -> Result<(), CoreError> {
        let address = SshSession::address(&self).to_owned();
        SshSession::close(self)
            .await
            .map_err(|e| session_error(&address, e))
    }
}

/// Attach the device address to protocol-level errors that lack one.
fn session_error(address: &str, err: vlanshift_ssh::Error) -> CoreError {
    match err {
        vlanshift_ssh::Error::Ssh(e) => CoreError::ConnectionFailed {
            address: address.to_owned(),
            reason: e.to_string(),
        },
        other => other.into(),
    }
}

// ── Test double ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted connector recording every session, config push and save.

    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    use vlanshift_ssh::Row;

    use super::{Connector, DeviceSession};
    use crate::error::CoreError;

    #[derive(Debug, Default)]
    pub struct Journal {
        pub opened: Vec<String>,
        pub closed: Vec<String>,
        pub commands: Vec<(String, String)>,
        pub config: Vec<(String, Vec<String>)>,
        pub persisted: Vec<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct Device {
        pub hostname: String,
        pub outputs: HashMap<String, Vec<Row>>,
        /// Config lines the device rejects.
        pub reject: HashSet<String>,
        /// Config lines the device never answers.
        pub stall: HashSet<String>,
        pub unprivileged: bool,
        pub fail_persist: bool,
    }

    #[derive(Debug, Clone, Default)]
    pub struct MockConnector {
        pub devices: HashMap<String, Device>,
        pub unreachable: HashSet<String>,
        pub deny_auth: HashSet<String>,
        /// Addresses whose session log cannot be created.
        pub log_failure: HashSet<String>,
        pub journal: Rc<RefCell<Journal>>,
    }

    impl MockConnector {
        pub fn with_device(mut self, address: &str, device: Device) -> Self {
            self.devices.insert(address.to_owned(), device);
            self
        }

        pub fn unreachable(mut self, address: &str) -> Self {
            self.unreachable.insert(address.to_owned());
            self
        }

        pub fn deny_auth(mut self, address: &str) -> Self {
            self.deny_auth.insert(address.to_owned());
            self
        }

        pub fn log_failure(mut self, address: &str) -> Self {
            self.log_failure.insert(address.to_owned());
            self
        }
    }

    pub struct MockSession {
        address: String,
        device: Device,
        journal: Rc<RefCell<Journal>>,
    }

    impl Connector for MockConnector {
        type Session = MockSession;

        async fn open(&self, address: &str) -> Result<MockSession, CoreError> {
            if self.deny_auth.contains(address) {
                return Err(CoreError::AuthenticationFailed {
                    address: address.to_owned(),
                    message: "rejected".into(),
                });
            }
            if self.log_failure.contains(address) {
                return Err(CoreError::Internal(
                    "session log: Permission denied (os error 13)".into(),
                ));
            }
            let device = match self.devices.get(address) {
                Some(device) if !self.unreachable.contains(address) => device.clone(),
                _ => {
                    return Err(CoreError::ConnectionFailed {
                        address: address.to_owned(),
                        reason: "connection refused".into(),
                    });
                }
            };
            self.journal.borrow_mut().opened.push(address.to_owned());
            Ok(MockSession {
                address: address.to_owned(),
                device,
                journal: Rc::clone(&self.journal),
            })
        }
    }

    impl DeviceSession for MockSession {
        fn address(&self) -> &str {
            &self.address
        }

        fn hostname(&self) -> &str {
            &self.device.hostname
        }

        fn is_privileged(&self) -> bool {
            !self.device.unprivileged
        }

        async fn run_structured(&mut self, command: &str) -> Result<Vec<Row>, CoreError> {
            self.journal
                .borrow_mut()
                .commands
                .push((self.address.clone(), command.to_owned()));
            self.device
                .outputs
                .get(command)
                .cloned()
                .ok_or_else(|| CoreError::CommandFailed {
                    address: self.address.clone(),
                    command: command.to_owned(),
                    message: "% Invalid input detected".into(),
                })
        }

        async fn apply_config(&mut self, lines: &[String]) -> Result<(), CoreError> {
            if lines.iter().any(|l| self.device.stall.contains(l)) {
                self.journal
                    .borrow_mut()
                    .config
                    .push((self.address.clone(), lines.to_vec()));
                return Err(CoreError::Timeout {
                    address: self.address.clone(),
                    timeout_secs: 30,
                });
            }
            if let Some(bad) = lines.iter().find(|l| self.device.reject.contains(*l)) {
                return Err(CoreError::CommandFailed {
                    address: self.address.clone(),
                    command: bad.clone(),
                    message: "% Invalid input detected".into(),
                });
            }
            self.journal
                .borrow_mut()
                .config
                .push((self.address.clone(), lines.to_vec()));
            Ok(())
        }

        async fn persist(&mut self) -> Result<(), CoreError> {
            self.journal.borrow_mut().persisted.push(self.address.clone());
            if self.device.fail_persist {
                return Err(CoreError::CommandFailed {
                    address: self.address.clone(),
                    command: "write memory".into(),
                    message: "% Error opening nvram:startup-config".into(),
                });
            }
            Ok(())
        }

        async fn close(self) -> Result<(), CoreError> {
            self.journal.borrow_mut().closed.push(self.address);
            Ok(())
        }
    }
}
