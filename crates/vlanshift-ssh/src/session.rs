// Interactive SSH session to a single switch
//
// IOS-style devices expose a line-oriented shell rather than an exec channel
// per command, so a session keeps one PTY shell open, writes each command
// followed by a newline, and reads until the device prompt reappears. Output
// is then cleaned of the echo and prompt and checked for error markers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle, KeyboardInteractiveAuthResponse};
use russh::{Channel, ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::prompt::{PromptMatcher, clean_output, error_marker};
use crate::schema::{Row, Schema};
use crate::transport::TransportConfig;

/// Username/password pair used for every device in a run.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Accepts any host key. Switch fleets rarely have their keys distributed,
/// and the fingerprint is logged for auditing.
struct DeviceHandler {
    address: String,
}

#[async_trait]
impl client::Handler for DeviceHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        debug!(
            address = %self.address,
            fingerprint = %server_public_key.fingerprint(),
            "accepting host key"
        );
        Ok(true)
    }
}

/// An authenticated interactive shell on one device.
///
/// Must be finished with [`close()`](Self::close); dropping it tears the
/// connection down without a clean disconnect.
pub struct SshSession {
    address: String,
    handle: Handle<DeviceHandler>,
    channel: Channel<client::Msg>,
    prompt: PromptMatcher,
    privileged: bool,
    timeout: Duration,
    transcript: Option<BufWriter<File>>,
}

impl SshSession {
    /// Connect, authenticate, open a shell, and learn the prompt.
    pub async fn open(
        host: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let address = host.to_owned();
        let limit = transport.timeout;
        let timed_out = || Error::Timeout {
            address: host.to_owned(),
            timeout_secs: limit.as_secs(),
        };

        debug!(%address, port = transport.port, "connecting");
        let handler = DeviceHandler {
            address: address.clone(),
        };
        let connect = client::connect(transport.client_config(), (host, transport.port), handler);
        let mut handle = match timeout(limit, connect).await {
            Err(_) => return Err(timed_out()),
            Ok(Err(e)) => {
                return Err(Error::Connect {
                    address,
                    reason: e.to_string(),
                });
            }
            Ok(Ok(handle)) => handle,
        };

        let authenticated = timeout(limit, authenticate(&mut handle, credentials)).await;
        match authenticated {
            Ok(Ok(true)) => debug!(%address, "authenticated"),
            Ok(Ok(false)) => {
                abandon(&handle, &address).await;
                return Err(Error::Authentication {
                    address,
                    message: format!("credentials for '{}' were rejected", credentials.username),
                });
            }
            Ok(Err(e)) => {
                abandon(&handle, &address).await;
                return Err(e);
            }
            Err(_) => {
                abandon(&handle, &address).await;
                return Err(timed_out());
            }
        }

        let shell = start_shell(&handle, &address, transport).await;
        let (channel, prompt, privileged, transcript) =
            disconnect_on_error(shell, || abandon(&handle, &address)).await?;

        let mut session = Self {
            address,
            handle,
            channel,
            prompt,
            privileged,
            timeout: limit,
            transcript,
        };
        if let Err(e) = session.setup_terminal(transport.term_width).await {
            if let Err(close_err) = session.close().await {
                trace!(error = %close_err, "disconnect after failed setup");
            }
            return Err(e);
        }
        Ok(session)
    }

    async fn setup_terminal(&mut self, width: u32) -> Result<(), Error> {
        self.send_command("terminal length 0").await?;
        self.send_command(&format!("terminal width {width}")).await?;
        Ok(())
    }

    /// The address this session was opened against.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Hostname taken from the device prompt.
    pub fn hostname(&self) -> &str {
        self.prompt.hostname()
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Send one command and return its cleaned output.
    pub async fn send_command(&mut self, command: &str) -> Result<String, Error> {
        debug!(address = %self.address, command, "sending command");
        self.channel.data(format!("{command}\n").as_bytes()).await?;

        let prompt = self.prompt.clone();
        let raw = read_until(
            &mut self.channel,
            &self.address,
            self.timeout,
            &mut self.transcript,
            |buf| prompt.ends_with_prompt(buf),
        )
        .await?;

        let output = clean_output(&raw, command, &self.prompt);
        if let Some(marker) = error_marker(&output) {
            return Err(Error::Command {
                address: self.address.clone(),
                command: command.to_owned(),
                message: marker.to_owned(),
            });
        }
        trace!(address = %self.address, lines = output.lines().count(), "command output");
        Ok(output)
    }

    /// Send a command whose output has a registered [`Schema`] and tabulate it.
    pub async fn send_structured(&mut self, command: &str) -> Result<Vec<Row>, Error> {
        let schema = Schema::for_command(command).ok_or_else(|| Error::NoSchema {
            command: command.to_owned(),
        })?;
        let output = self.send_command(command).await?;
        let rows = schema.parse(&output);
        debug!(address = %self.address, command, rows = rows.len(), "parsed output");
        Ok(rows)
    }

    /// Enter configuration mode, send each line, and return to exec mode.
    ///
    /// Stops at the first rejected line; `end` is still sent so the session
    /// is left in exec mode.
    pub async fn send_config_set(&mut self, lines: &[String]) -> Result<String, Error> {
        let mut output = self.send_command("configure terminal").await?;
        let mut result = Ok(());
        for line in lines {
            match self.send_command(line).await {
                Ok(out) => {
                    output.push('\n');
                    output.push_str(&out);
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        let end = self.send_command("end").await;
        result?;
        end?;
        Ok(output)
    }

    /// Copy the running configuration to startup (`write memory`).
    pub async fn save_config(&mut self) -> Result<String, Error> {
        self.send_command("write memory").await
    }

    /// Log out and disconnect, flushing the session log.
    pub async fn close(mut self) -> Result<(), Error> {
        debug!(address = %self.address, "closing session");
        if let Err(e) = self.channel.data(&b"exit\n"[..]).await {
            trace!(error = %e, "exit not delivered");
        }
        if let Some(mut log) = self.transcript.take() {
            log.flush()?;
        }
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        Ok(())
    }
}

type Shell = (Channel<client::Msg>, PromptMatcher, bool, Option<BufWriter<File>>);

/// Open a PTY shell on an authenticated connection and learn the prompt.
async fn start_shell(
    handle: &Handle<DeviceHandler>,
    address: &str,
    transport: &TransportConfig,
) -> Result<Shell, Error> {
    let limit = transport.timeout;
    let mut channel = handle.channel_open_session().await?;
    channel
        .request_pty(false, "vt100", transport.term_width, 24, 0, 0, &[])
        .await?;
    channel.request_shell(false).await?;

    let mut transcript = match transport.session_log_path(address) {
        Some(path) => {
            debug!(path = %path.display(), "writing session log");
            Some(BufWriter::new(File::create(path)?))
        }
        None => None,
    };

    // Banner first, then a bare newline so the prompt is read on its own line.
    read_until(&mut channel, address, limit, &mut transcript, |buf| {
        PromptMatcher::detect(buf).is_some()
    })
    .await?;
    channel.data(&b"\n"[..]).await?;
    let tail = read_until(&mut channel, address, limit, &mut transcript, |buf| {
        PromptMatcher::detect(buf).is_some()
    })
    .await?;
    let prompt = PromptMatcher::detect(&tail).ok_or_else(|| Error::ChannelClosed {
        address: address.to_owned(),
    })?;
    let privileged = prompt.is_privileged(&tail);
    if !privileged {
        warn!(%address, "session is not in privileged mode; configuration changes will be refused");
    }
    Ok((channel, prompt, privileged, transcript))
}

/// Run `cleanup` before handing back an error.
async fn disconnect_on_error<T, C, F>(result: Result<T, Error>, cleanup: C) -> Result<T, Error>
where
    C: FnOnce() -> F,
    F: Future<Output = ()>,
{
    if result.is_err() {
        cleanup().await;
    }
    result
}

/// Drop a connection that never became a usable session.
async fn abandon(handle: &Handle<DeviceHandler>, address: &str) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
    {
        trace!(%address, error = %e, "disconnect after failed open");
    }
}

/// Password first, then keyboard-interactive answering every prompt with the
/// password (many IOS images only offer the latter for local accounts).
async fn authenticate(
    handle: &mut Handle<DeviceHandler>,
    credentials: &Credentials,
) -> Result<bool, Error> {
    let password = credentials.password.expose_secret();
    if handle
        .authenticate_password(credentials.username.as_str(), password)
        .await?
    {
        return Ok(true);
    }

    let mut response = handle
        .authenticate_keyboard_interactive_start(credentials.username.as_str(), None::<String>)
        .await?;
    for _ in 0..3 {
        let answers = match &response {
            KeyboardInteractiveAuthResponse::Success => return Ok(true),
            KeyboardInteractiveAuthResponse::Failure => return Ok(false),
            KeyboardInteractiveAuthResponse::InfoRequest { prompts, .. } => {
                vec![password.to_owned(); prompts.len()]
            }
        };
        response = handle
            .authenticate_keyboard_interactive_respond(answers)
            .await?;
    }
    Ok(matches!(response, KeyboardInteractiveAuthResponse::Success))
}

/// Accumulate channel data until `done` accepts the buffer or the deadline passes.
async fn read_until(
    channel: &mut Channel<client::Msg>,
    address: &str,
    limit: Duration,
    transcript: &mut Option<BufWriter<File>>,
    mut done: impl FnMut(&str) -> bool,
) -> Result<String, Error> {
    let deadline = Instant::now() + limit;
    let mut buffer = String::new();
    loop {
        let Ok(msg) = timeout_at(deadline, channel.wait()).await else {
            return Err(Error::Timeout {
                address: address.to_owned(),
                timeout_secs: limit.as_secs(),
            });
        };
        match msg {
            Some(ChannelMsg::Data { data } | ChannelMsg::ExtendedData { data, .. }) => {
                let text = String::from_utf8_lossy(&data);
                if let Some(log) = transcript.as_mut() {
                    log.write_all(text.as_bytes())?;
                }
                buffer.push_str(&text);
                if done(&buffer) {
                    return Ok(buffer);
                }
            }
            Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                return Err(Error::ChannelClosed {
                    address: address.to_owned(),
                });
            }
            Some(_) => trace!("ignoring channel message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn failed_setup_runs_cleanup() {
        let cleaned = Cell::new(false);
        let result: Result<(), Error> = disconnect_on_error(
            Err(Error::ChannelClosed {
                address: "10.0.0.5".into(),
            }),
            || async { cleaned.set(true) },
        )
        .await;
        assert!(matches!(result, Err(Error::ChannelClosed { .. })));
        assert!(cleaned.get());
    }

    #[tokio::test]
    async fn successful_setup_keeps_connection() {
        let cleaned = Cell::new(false);
        let result = disconnect_on_error(Ok(7), || async { cleaned.set(true) }).await;
        assert_eq!(result.ok(), Some(7));
        assert!(!cleaned.get());
    }
}
