//! Discovery and remediation pipeline between `vlanshift-ssh` and the CLI.
//!
//! This crate owns the domain model and every decision the tool makes:
//!
//! - **[`normalize()`]**: Parses colon, dash, dotted and bare-hex MAC
//!   addresses into a canonical [`MacAddress`].
//!
//! - **[`Connector`] / [`DeviceSession`]**: The session seam. Typed table
//!   queries ([`forwarding_table()`](DeviceSession::forwarding_table),
//!   [`aggregated_ports()`](DeviceSession::aggregated_ports),
//!   [`neighbors()`](DeviceSession::neighbors)) convert transport `Row`s into
//!   model types at the boundary. [`SshConnector`] is the production
//!   implementation.
//!
//! - **[`topology`]**: Resolves core forwarding-table ports through
//!   port-channel membership and CDP neighbors to access-switch addresses.
//!
//! - **[`locate()`]**: Visits candidate switches sequentially, first match
//!   wins, and partitions the requested MACs into located and unlocated.
//!
//! - **[`plan()`] / [`apply()`]**: Classifies located devices against the
//!   desired access VLAN and pushes changes with one session and one save
//!   per switch.
//!
//! - **[`export()`]**: Writes the final device state as CSV.

pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod input;
pub mod locator;
pub mod model;
pub mod remediation;
pub mod session;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SessionConfig;
pub use error::CoreError;
pub use export::{EXPORT_HEADER, export, export_to_writer, with_csv_extension};
pub use input::{MacList, RejectedRecord, parse_mac_list, read_mac_list};
pub use locator::{LocateOutcome, SkippedSwitch, locate};
pub use remediation::{
    ApplyReport, DeviceFailure, RemediationPlan, RemediationState, SwitchGroup, UnsavedSwitch,
    apply, plan,
};
pub use session::{Connector, DeviceSession, SshConnector, finish};
pub use topology::{CandidatePorts, CoreSnapshot, Resolution, Unresolved, resolve};

pub use model::{
    AggregatedPort, ForwardingEntry, InterfaceName, InvalidAddress, InvalidVlan, LocatedDevice,
    MacAddress, NeighborRecord, PortName, VlanId, normalize,
};
