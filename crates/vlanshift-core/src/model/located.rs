// ── Located end devices ──

use std::net::IpAddr;

use serde::Serialize;

use super::interface::{InterfaceName, VlanId};
use super::mac::MacAddress;

/// An end device confirmed on a specific access-switch interface.
///
/// `current_vlan` is always what the switch reported, or the VLAN that was
/// successfully pushed to it afterwards; never a requested value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedDevice {
    pub mac: MacAddress,
    pub switch_address: IpAddr,
    pub switch_hostname: String,
    pub interface: InterfaceName,
    pub current_vlan: VlanId,
}
