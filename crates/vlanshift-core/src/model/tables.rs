// ── Typed device table records ──
//
// Produced from session rows by `convert`; nothing downstream sees raw rows.

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use super::interface::{InterfaceName, PortName, VlanId};
use super::mac::MacAddress;

/// One forwarding-table row: where a MAC was last learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingEntry {
    pub mac: MacAddress,
    pub port: PortName,
    pub vlan: VlanId,
}

/// Member flag from `show etherchannel summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemberStatus {
    /// `P`: bundled in the port-channel.
    Bundled,
    /// `D`: down.
    Down,
    /// `I`: stand-alone.
    Standalone,
    /// `s`: suspended.
    Suspended,
    /// `H`: hot-standby (LACP only).
    HotStandby,
    /// Any other flag combination, kept verbatim.
    Other(String),
}

impl MemberStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "P" => Self::Bundled,
            "D" => Self::Down,
            "I" => Self::Standalone,
            "s" => Self::Suspended,
            "H" => Self::HotStandby,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Bundled => "P",
            Self::Down => "D",
            Self::Standalone => "I",
            Self::Suspended => "s",
            Self::HotStandby => "H",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A member interface of an aggregate together with its status flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateMember {
    pub interface: InterfaceName,
    pub status: MemberStatus,
}

/// Interface and status lists of different lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMismatch {
    pub interfaces: usize,
    pub statuses: usize,
}

/// A link-aggregation group and its members, in device order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedPort {
    pub name: PortName,
    members: Vec<AggregateMember>,
}

impl AggregatedPort {
    /// Pair parallel interface/status lists. Lengths must agree.
    pub fn new(
        name: PortName,
        interfaces: Vec<InterfaceName>,
        statuses: Vec<MemberStatus>,
    ) -> Result<Self, MemberMismatch> {
        if interfaces.len() != statuses.len() {
            return Err(MemberMismatch {
                interfaces: interfaces.len(),
                statuses: statuses.len(),
            });
        }
        let members = interfaces
            .into_iter()
            .zip(statuses)
            .map(|(interface, status)| AggregateMember { interface, status })
            .collect();
        Ok(Self { name, members })
    }

    pub fn members(&self) -> &[AggregateMember] {
        &self.members
    }

    pub fn member_interfaces(&self) -> impl Iterator<Item = &InterfaceName> {
        self.members.iter().map(|m| &m.interface)
    }

    pub fn member_status(&self) -> impl Iterator<Item = &MemberStatus> {
        self.members.iter().map(|m| &m.status)
    }

    /// The member used to reach the neighbor: the first bundled member,
    /// else the first down member, else none.
    pub fn active_member(&self) -> Option<&InterfaceName> {
        self.members
            .iter()
            .find(|m| m.status == MemberStatus::Bundled)
            .or_else(|| self.members.iter().find(|m| m.status == MemberStatus::Down))
            .map(|m| &m.interface)
    }
}

/// One neighbor-discovery (CDP) entry on the core device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborRecord {
    pub local_interface: InterfaceName,
    pub management_address: IpAddr,
    pub device_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn po(statuses: &[&str]) -> AggregatedPort {
        let interfaces = (1..=statuses.len())
            .map(|i| InterfaceName::new(format!("Gi1/0/{i}")))
            .collect();
        let statuses = statuses.iter().map(|s| MemberStatus::from_code(s)).collect();
        AggregatedPort::new(PortName::new("Po1"), interfaces, statuses).unwrap()
    }

    #[test]
    fn active_member_prefers_bundled() {
        let port = po(&["D", "P", "P"]);
        assert_eq!(port.active_member().unwrap().as_str(), "Gi1/0/2");
    }

    #[test]
    fn active_member_falls_back_to_down() {
        let port = po(&["s", "D"]);
        assert_eq!(port.active_member().unwrap().as_str(), "Gi1/0/2");
    }

    #[test]
    fn active_member_none_when_unusable() {
        assert!(po(&["s", "I"]).active_member().is_none());
        assert!(po(&[]).active_member().is_none());
    }

    #[test]
    fn mismatched_member_lists_rejected() {
        let err = AggregatedPort::new(
            PortName::new("Po2"),
            vec![InterfaceName::new("Te1/1/1")],
            vec![],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MemberMismatch {
                interfaces: 1,
                statuses: 0
            }
        );
    }

    #[test]
    fn member_views_stay_parallel() {
        let port = po(&["P", "D"]);
        let names: Vec<_> = port.member_interfaces().map(InterfaceName::as_str).collect();
        let codes: Vec<_> = port.member_status().map(MemberStatus::code).collect();
        assert_eq!(names, ["Gi1/0/1", "Gi1/0/2"]);
        assert_eq!(codes, ["P", "D"]);
    }
}
