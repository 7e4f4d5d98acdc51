// ── Topology resolution ──
//
// Turns the core device's view (forwarding table, port-channel membership,
// CDP neighbors) into the ordered set of access switches worth visiting.

use std::fmt;
use std::net::IpAddr;

use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{
    AggregatedPort, ForwardingEntry, InterfaceName, MacAddress, NeighborRecord, PortName,
};
use crate::session::DeviceSession;

/// Everything read from the core device in one session.
#[derive(Debug, Clone, Default)]
pub struct CoreSnapshot {
    pub hostname: String,
    pub forwarding: Vec<ForwardingEntry>,
    pub aggregates: Vec<AggregatedPort>,
    pub neighbors: Vec<NeighborRecord>,
}

/// Ports on the core where requested MACs were learned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePorts {
    /// Distinct ports, in forwarding-table order.
    pub ports: IndexSet<PortName>,
    /// Requested MACs the core has not learned at all.
    pub missing: Vec<MacAddress>,
}

impl CoreSnapshot {
    /// Query the forwarding, etherchannel and CDP tables.
    pub async fn collect<S: DeviceSession>(session: &mut S) -> Result<Self, CoreError> {
        let forwarding = session.forwarding_table().await?;
        let aggregates = session.aggregated_ports().await?;
        let neighbors = session.neighbors().await?;
        info!(
            core = session.hostname(),
            macs = forwarding.len(),
            aggregates = aggregates.len(),
            neighbors = neighbors.len(),
            "core tables collected"
        );
        Ok(Self {
            hostname: session.hostname().to_owned(),
            forwarding,
            aggregates,
            neighbors,
        })
    }

    pub fn candidate_ports(&self, targets: &IndexSet<MacAddress>) -> CandidatePorts {
        let ports: IndexSet<PortName> = self
            .forwarding
            .iter()
            .filter(|entry| targets.contains(&entry.mac))
            .map(|entry| entry.port.clone())
            .collect();
        let missing = targets
            .iter()
            .filter(|mac| !self.forwarding.iter().any(|entry| entry.mac == **mac))
            .copied()
            .collect();
        CandidatePorts { ports, missing }
    }

    pub fn resolve(&self, candidates: &IndexSet<PortName>) -> Resolution {
        resolve(&self.forwarding, &self.aggregates, &self.neighbors, candidates)
    }
}

/// Why a candidate port did not lead to a switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// Aggregate with no bundled or down member.
    NoActiveMember { port: PortName },
    /// No CDP neighbor on the chosen interface.
    NoNeighbor {
        port: PortName,
        interface: InterfaceName,
    },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveMember { port } => {
                write!(f, "{port}: no bundled or down member interface")
            }
            Self::NoNeighbor { port, interface } if port.as_str() == interface.as_str() => {
                write!(f, "{port}: no CDP neighbor on this port")
            }
            Self::NoNeighbor { port, interface } => {
                write!(f, "{port}: no CDP neighbor on member {interface}")
            }
        }
    }
}

/// Result of [`resolve`]: switches to visit plus per-port diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub addresses: IndexSet<IpAddr>,
    pub diagnostics: Vec<Unresolved>,
}

/// Resolve candidate ports to neighbor management addresses.
///
/// Ports are walked in forwarding-table order. An aggregate resolves through
/// its active member; a physical port is matched against the neighbor table
/// directly. Interface names are compared in long form on both sides.
pub fn resolve(
    forwarding: &[ForwardingEntry],
    aggregates: &[AggregatedPort],
    neighbors: &[NeighborRecord],
    candidates: &IndexSet<PortName>,
) -> Resolution {
    let mut resolution = Resolution::default();
    let ordered: IndexSet<&PortName> = forwarding
        .iter()
        .map(|entry| &entry.port)
        .filter(|port| candidates.contains(*port))
        .collect();

    for port in ordered {
        let interface = match aggregates.iter().find(|agg| agg.name.matches(port)) {
            Some(aggregate) => {
                let Some(member) = aggregate.active_member() else {
                    warn!(%port, "aggregate has no usable member");
                    resolution.diagnostics.push(Unresolved::NoActiveMember {
                        port: port.clone(),
                    });
                    continue;
                };
                member.clone()
            }
            None => InterfaceName::from(port.clone()),
        };

        match neighbors
            .iter()
            .find(|n| n.local_interface.matches(&interface))
        {
            Some(neighbor) => {
                debug!(
                    %port,
                    %interface,
                    neighbor = %neighbor.device_id,
                    address = %neighbor.management_address,
                    "resolved port"
                );
                resolution.addresses.insert(neighbor.management_address);
            }
            None => {
                warn!(%port, %interface, "no neighbor on interface");
                resolution.diagnostics.push(Unresolved::NoNeighbor {
                    port: port.clone(),
                    interface,
                });
            }
        }
    }
    resolution
}
