// `show mac address-table`
//
// Handles the IOS/IOS-XE layout (`Vlan Mac Address Type Ports`) as well as the
// older Catalyst 6500 / NX-OS layouts that prefix rows with `*` and carry
// extra age/secure columns. The port is always the last column.

use super::Row;

pub(super) fn parse(output: &str) -> Vec<Row> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Row> {
    let tokens: Vec<&str> = line
        .split_whitespace()
        .filter(|t| !matches!(*t, "*" | "+" | "G" | "R" | "O"))
        .collect();
    let mac_idx = tokens.iter().position(|t| is_dotted_mac(t))?;
    // vlan, mac, type and port at minimum
    if tokens.len() < mac_idx + 3 {
        return None;
    }
    let vlan = *tokens.get(mac_idx.checked_sub(1)?)?;
    let mac = *tokens.get(mac_idx)?;
    let kind = *tokens.get(mac_idx + 1)?;
    let port = *tokens.last()?;

    Some(
        Row::new()
            .with_text("destination_address", mac)
            .with_text("type", kind)
            .with_text("vlan", vlan)
            .with_text("destination_port", port),
    )
}

fn is_dotted_mac(token: &str) -> bool {
    let groups: Vec<&str> = token.split('.').collect();
    groups.len() == 3
        && groups
            .iter()
            .all(|g| g.len() == 4 && g.chars().all(|c| c.is_ascii_hexdigit()))
}
