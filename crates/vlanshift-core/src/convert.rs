// ── Row-to-domain type conversions ──
//
// Bridges `vlanshift_ssh::Row`s into canonical `vlanshift_core::model` types.
// Rows that describe things the pipeline never acts on (CPU and router MACs,
// neighbors without an IPv4/IPv6 management address) are dropped here with a
// trace so later stages only see usable records.

use std::net::IpAddr;

use tracing::trace;
use vlanshift_ssh::{Row, Schema};

use crate::error::CoreError;
use crate::model::{
    AggregatedPort, ForwardingEntry, InterfaceName, MemberStatus, NeighborRecord, PortName, VlanId,
    normalize,
};

// ── Forwarding table ───────────────────────────────────────────────

fn forwarding_entry(row: &Row) -> Option<ForwardingEntry> {
    let mac = normalize(row.text("destination_address")?).ok()?;
    let vlan: VlanId = row.text("vlan")?.parse().ok()?;
    let port = PortName::new(row.text("destination_port")?);
    Some(ForwardingEntry { mac, port, vlan })
}

/// Convert `show mac address-table` rows, skipping system entries.
pub fn forwarding_table(rows: &[Row]) -> Vec<ForwardingEntry> {
    rows.iter()
        .filter_map(|row| {
            let entry = forwarding_entry(row);
            if entry.is_none() {
                trace!(?row, "skipping forwarding row");
            }
            entry
        })
        .collect()
}

// ── Aggregates ─────────────────────────────────────────────────────

/// Convert `show etherchannel summary` rows.
pub fn aggregated_ports(rows: &[Row]) -> Result<Vec<AggregatedPort>, CoreError> {
    rows.iter()
        .filter_map(|row| row.text("po_name").map(|name| (name, row)))
        .map(|(name, row)| {
            let interfaces = row
                .list("interfaces")
                .iter()
                .map(InterfaceName::new)
                .collect();
            let statuses = row
                .list("interfaces_status")
                .iter()
                .map(|code| MemberStatus::from_code(code))
                .collect();
            AggregatedPort::new(PortName::new(name), interfaces, statuses).map_err(|m| {
                CoreError::Schema {
                    command: Schema::EtherchannelSummary.command().into(),
                    message: format!(
                        "{name} lists {} members but {} status flags",
                        m.interfaces, m.statuses
                    ),
                }
            })
        })
        .collect()
}

// ── Neighbors ──────────────────────────────────────────────────────

fn neighbor_record(row: &Row) -> Option<NeighborRecord> {
    let management_address: IpAddr = row.text("management_ip")?.parse().ok()?;
    Some(NeighborRecord {
        local_interface: InterfaceName::new(row.text("local_port")?),
        management_address,
        device_id: row.text("destination_host").unwrap_or_default().to_owned(),
    })
}

/// Convert `show cdp neighbors detail` rows, skipping neighbors without a
/// usable management address.
pub fn neighbor_table(rows: &[Row]) -> Vec<NeighborRecord> {
    rows.iter()
        .filter_map(|row| {
            let record = neighbor_record(row);
            if record.is_none() {
                trace!(?row, "skipping neighbor without management address");
            }
            record
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mac_row(mac: &str, vlan: &str, port: &str) -> Row {
        Row::new()
            .with_text("destination_address", mac)
            .with_text("type", "DYNAMIC")
            .with_text("vlan", vlan)
            .with_text("destination_port", port)
    }

    #[test]
    fn forwarding_skips_system_entries() {
        let rows = vec![
            mac_row("0100.0ccc.cccc", "All", "CPU"),
            mac_row("0011.2233.4455", "20", "Po1"),
        ];
        let table = forwarding_table(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].mac.to_string(), "0011.2233.4455");
        assert_eq!(table[0].port.as_str(), "Po1");
        assert_eq!(table[0].vlan.get(), 20);
    }

    #[test]
    fn aggregates_pair_members_with_flags() {
        let rows = vec![
            Row::new()
                .with_text("po_name", "Po1")
                .with_list("interfaces", vec!["Te1/1/1".into(), "Te2/1/1".into()])
                .with_list("interfaces_status", vec!["D".into(), "P".into()]),
        ];
        let ports = aggregated_ports(&rows).unwrap();
        assert_eq!(ports[0].active_member().unwrap().as_str(), "Te2/1/1");
    }

    #[test]
    fn aggregate_length_mismatch_is_schema_error() {
        let rows = vec![
            Row::new()
                .with_text("po_name", "Po3")
                .with_list("interfaces", vec!["Te1/1/1".into()])
                .with_list("interfaces_status", vec![]),
        ];
        assert!(matches!(
            aggregated_ports(&rows),
            Err(CoreError::Schema { .. })
        ));
    }

    #[test]
    fn neighbors_need_management_ip() {
        let rows = vec![
            Row::new()
                .with_text("destination_host", "acc-sw01")
                .with_text("management_ip", "10.0.0.5")
                .with_text("local_port", "TenGigabitEthernet1/1/1"),
            Row::new()
                .with_text("destination_host", "phone")
                .with_text("management_ip", "")
                .with_text("local_port", "GigabitEthernet1/0/5"),
        ];
        let table = neighbor_table(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].management_address.to_string(), "10.0.0.5");
        assert_eq!(table[0].device_id, "acc-sw01");
    }
}
