// `show cdp neighbors detail`
//
// One block per neighbor, opened by `Device ID:`. The management address is
// taken from `Management address(es):` when present, otherwise from the
// first `Entry address(es):` IP.

use super::Row;

#[derive(Default)]
struct Block {
    device_id: String,
    entry_ip: Option<String>,
    mgmt_ip: Option<String>,
    platform: String,
    capabilities: String,
    local_port: String,
    remote_port: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Entry,
    Management,
}

pub(super) fn parse(output: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut block: Option<Block> = None;
    let mut section = Section::Other;

    for line in output.lines().map(str::trim) {
        if let Some(id) = line.strip_prefix("Device ID:") {
            rows.extend(block.take().map(Block::into_row));
            block = Some(Block {
                device_id: id.trim().to_owned(),
                ..Block::default()
            });
            section = Section::Other;
            continue;
        }
        let Some(b) = block.as_mut() else {
            continue;
        };

        if line.starts_with("Entry address") {
            section = Section::Entry;
        } else if line.starts_with("Management address") {
            section = Section::Management;
        } else if let Some(ip) = line
            .strip_prefix("IP address:")
            .or_else(|| line.strip_prefix("IPv4 Address:"))
        {
            let ip = ip.trim().to_owned();
            match section {
                Section::Entry if b.entry_ip.is_none() => b.entry_ip = Some(ip),
                Section::Management if b.mgmt_ip.is_none() => b.mgmt_ip = Some(ip),
                _ => {}
            }
        } else if let Some(rest) = line.strip_prefix("Platform:") {
            let (platform, caps) = rest.split_once("Capabilities:").unwrap_or((rest, ""));
            b.platform = platform.trim().trim_end_matches(',').trim().to_owned();
            b.capabilities = caps.trim().to_owned();
            section = Section::Other;
        } else if let Some(rest) = line.strip_prefix("Interface:") {
            let (local, remote) = rest.split_once(',').unwrap_or((rest, ""));
            b.local_port = local.trim().to_owned();
            b.remote_port = remote
                .split_once(':')
                .map_or("", |(_, port)| port)
                .trim()
                .to_owned();
            section = Section::Other;
        } else if !line.starts_with("IPv6") && !line.is_empty() && section != Section::Other {
            section = Section::Other;
        }
    }
    rows.extend(block.map(Block::into_row));
    rows
}

impl Block {
    fn into_row(self) -> Row {
        let management_ip = self.mgmt_ip.or(self.entry_ip).unwrap_or_default();
        Row::new()
            .with_text("destination_host", self.device_id)
            .with_text("management_ip", management_ip)
            .with_text("platform", self.platform)
            .with_text("capabilities", self.capabilities)
            .with_text("local_port", self.local_port)
            .with_text("remote_port", self.remote_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DETAIL: &str = "-------------------------
Device ID: acc-sw01.example.net
Entry address(es):
  IP address: 192.168.50.5
Platform: cisco WS-C3850-48P,  Capabilities: Switch IGMP
Interface: TenGigabitEthernet1/1/1,  Port ID (outgoing port): TenGigabitEthernet1/1/4
Holdtime : 137 sec

Version :
Cisco IOS Software, IOS-XE Software, Catalyst L3 Switch Software

advertisement version: 2
Management address(es):
  IP address: 10.0.0.5

-------------------------
Device ID: acc-sw02
Entry address(es):
  IP address: 10.0.0.6
Platform: cisco C9300-24P,  Capabilities: Router Switch IGMP
Interface: TenGigabitEthernet2/1/1,  Port ID (outgoing port): TenGigabitEthernet1/1/1
Holdtime : 150 sec
";

    #[test]
    fn parses_neighbor_blocks() {
        let rows = parse(DETAIL);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("destination_host"), Some("acc-sw01.example.net"));
        assert_eq!(rows[0].text("local_port"), Some("TenGigabitEthernet1/1/1"));
        assert_eq!(rows[0].text("remote_port"), Some("TenGigabitEthernet1/1/4"));
        assert_eq!(rows[0].text("platform"), Some("cisco WS-C3850-48P"));
        assert_eq!(rows[0].text("capabilities"), Some("Switch IGMP"));
    }

    #[test]
    fn prefers_management_address() {
        let rows = parse(DETAIL);
        assert_eq!(rows[0].text("management_ip"), Some("10.0.0.5"));
    }

    #[test]
    fn falls_back_to_entry_address() {
        let rows = parse(DETAIL);
        assert_eq!(rows[1].text("management_ip"), Some("10.0.0.6"));
    }

    #[test]
    fn no_neighbors() {
        assert!(parse("% CDP is not enabled").is_empty());
    }
}
