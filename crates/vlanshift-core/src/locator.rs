// ── Device locator ──
//
// Visits candidate switches one at a time and pins each requested MAC to the
// first switch whose forwarding table shows it on a physical port.

use std::net::IpAddr;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{LocatedDevice, MacAddress};
use crate::session::{Connector, DeviceSession, finish};

/// A candidate switch that could not be searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSwitch {
    pub address: IpAddr,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocateOutcome {
    /// Located devices in discovery order.
    pub located: Vec<LocatedDevice>,
    /// Requested MACs found on no visited switch.
    pub unlocated: Vec<MacAddress>,
    pub skipped: Vec<SkippedSwitch>,
    /// Switches whose tables were read.
    pub visited: usize,
}

impl LocateOutcome {
    /// Distinct switches hosting at least one located device.
    pub fn switch_count(&self) -> usize {
        self.located
            .iter()
            .map(|d| d.switch_address)
            .collect::<IndexSet<_>>()
            .len()
    }
}

/// Search `candidates` in order for every MAC in `targets`.
///
/// A MAC is bound to the first switch that reports it and never reassigned.
/// Unreachable or failing switches are skipped; an authentication failure
/// aborts, since the same credentials are used everywhere.
pub async fn locate<C: Connector>(
    connector: &C,
    candidates: &IndexSet<IpAddr>,
    targets: &IndexSet<MacAddress>,
) -> Result<LocateOutcome, CoreError> {
    let mut located: IndexMap<MacAddress, LocatedDevice> = IndexMap::new();
    let mut outcome = LocateOutcome::default();

    for &address in candidates {
        match search_switch(connector, address, targets, &mut located).await {
            Ok(()) => outcome.visited += 1,
            Err(e) if e.is_device_scoped() => {
                warn!(%address, error = %e, "skipping switch");
                outcome.skipped.push(SkippedSwitch {
                    address,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    outcome.unlocated = targets
        .iter()
        .filter(|mac| !located.contains_key(*mac))
        .copied()
        .collect();
    outcome.located = located.into_values().collect();
    info!(
        located = outcome.located.len(),
        unlocated = outcome.unlocated.len(),
        switches = outcome.visited,
        "locate finished"
    );
    Ok(outcome)
}

async fn search_switch<C: Connector>(
    connector: &C,
    address: IpAddr,
    targets: &IndexSet<MacAddress>,
    located: &mut IndexMap<MacAddress, LocatedDevice>,
) -> Result<(), CoreError> {
    let mut session = connector.open(&address.to_string()).await?;
    let table = session.forwarding_table().await;
    let hostname = session.hostname().to_owned();
    finish(session).await;

    for entry in table? {
        if !targets.contains(&entry.mac) || located.contains_key(&entry.mac) {
            continue;
        }
        if entry.port.is_aggregate() {
            debug!(%address, mac = %entry.mac, port = %entry.port, "learned on uplink");
            continue;
        }
        info!(mac = %entry.mac, switch = %hostname, port = %entry.port, "located");
        located.insert(
            entry.mac,
            LocatedDevice {
                mac: entry.mac,
                switch_address: address,
                switch_hostname: hostname.clone(),
                interface: entry.port.into(),
                current_vlan: entry.vlan,
            },
        );
    }
    Ok(())
}
