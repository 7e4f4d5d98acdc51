//! Discovery phase shared by `run` and `locate`: read the MAC list, read the
//! core switch, resolve candidate switches, and locate each MAC.

use vlanshift_core::{
    Connector, CoreSnapshot, LocateOutcome, SshConnector, finish, locate, read_mac_list,
};

use crate::commands::util;
use crate::config::RunContext;
use crate::error::CliError;
use crate::output::Reporter;

/// Result of the discovery phase.
#[derive(Debug)]
pub struct Discovery {
    pub core_hostname: String,
    pub requested: usize,
    pub outcome: LocateOutcome,
}

/// Run discovery. `Ok(None)` means there was nothing valid to look for.
///
/// Any failure talking to the core switch is fatal: nothing downstream can
/// be trusted without its tables.
pub async fn discover(ctx: &RunContext, reporter: &Reporter) -> Result<Option<Discovery>, CliError> {
    tracing::debug!(
        profile = %ctx.profile_name,
        core = %ctx.core,
        port = ctx.session.port,
        "starting discovery"
    );

    // ── Input ────────────────────────────────────────────────────────
    let list = read_mac_list(&ctx.input)?;
    for rejected in &list.rejected {
        reporter.warn(format!(
            "line {}: '{}' appears to be an invalid MAC address ({})",
            rejected.line, rejected.raw, rejected.reason
        ));
    }
    if list.macs.is_empty() {
        reporter.warn(format!(
            "No valid MAC addresses in {}",
            ctx.input.display()
        ));
        return Ok(None);
    }
    reporter.step(format!(
        "Loaded {} MAC addresses from {}",
        list.macs.len(),
        ctx.input.display()
    ));

    // ── Core switch ──────────────────────────────────────────────────
    let connector = SshConnector::new(&ctx.session);
    let spinner = util::spinner(
        format!("Reading tables from core switch {}", ctx.core),
        reporter.quiet(),
    );
    let snapshot = match connector.open(&ctx.core).await {
        Ok(mut session) => {
            let snapshot = CoreSnapshot::collect(&mut session).await;
            finish(session).await;
            snapshot
        }
        Err(e) => Err(e),
    };
    spinner.finish_and_clear();
    let snapshot = snapshot?;
    reporter.success(format!(
        "Connected to core switch {} ({})",
        snapshot.hostname, ctx.core
    ));

    let candidates = snapshot.candidate_ports(&list.macs);
    for mac in &candidates.missing {
        reporter.warn(format!("{mac} was not found on the core switch"));
    }

    let resolution = snapshot.resolve(&candidates.ports);
    for diagnostic in &resolution.diagnostics {
        reporter.warn(format!("Unable to resolve {diagnostic}"));
    }
    if !resolution.addresses.is_empty() {
        reporter.rule();
        reporter.step("Requested MAC addresses reside behind these switches:");
        for address in &resolution.addresses {
            reporter.item(address);
        }
    }

    // ── Access switches ──────────────────────────────────────────────
    reporter.rule();
    let spinner = util::spinner(
        format!("Searching {} switches", resolution.addresses.len()),
        reporter.quiet(),
    );
    let outcome = locate(&connector, &resolution.addresses, &list.macs).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    for skipped in &outcome.skipped {
        reporter.warn(format!("Skipped {}: {}", skipped.address, skipped.reason));
    }
    for device in &outcome.located {
        reporter.item(format!(
            "{} located on {} {}",
            device.mac, device.switch_hostname, device.interface
        ));
    }

    Ok(Some(Discovery {
        core_hostname: snapshot.hostname,
        requested: list.macs.len(),
        outcome,
    }))
}

/// Print the "located N on M switches" summary and any unlocated MACs.
pub fn summarize(discovery: &Discovery, reporter: &Reporter) {
    let outcome = &discovery.outcome;
    reporter.rule();
    reporter.success(format!(
        "Located {} of {} end devices on {} different switches (core: {})",
        outcome.located.len(),
        discovery.requested,
        outcome.switch_count(),
        discovery.core_hostname
    ));
    if !outcome.unlocated.is_empty() {
        reporter.warn("Not located:");
        for mac in &outcome.unlocated {
            reporter.item(mac);
        }
    }
}
