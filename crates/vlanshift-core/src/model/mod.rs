// ── Domain model ──
//
// Canonical types shared by every pipeline stage.

pub mod interface;
pub mod located;
pub mod mac;
pub mod tables;

pub use interface::{InterfaceName, InvalidVlan, PortName, VlanId};
pub use located::LocatedDevice;
pub use mac::{InvalidAddress, MacAddress, normalize};
pub use tables::{
    AggregateMember, AggregatedPort, ForwardingEntry, MemberMismatch, MemberStatus, NeighborRecord,
};
