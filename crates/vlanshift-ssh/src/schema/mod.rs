// Tabular output schemas
//
// Each schema turns the free-form text of one `show` command into `Row`s
// keyed by stable field names. Consumers look fields up by name and never
// re-parse device text themselves.

mod cdp;
mod etherchannel;
mod mac_table;

use indexmap::IndexMap;
use serde::Serialize;

/// A single parsed field: scalar text or a list (member interfaces, flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Text(String),
    List(Vec<String>),
}

/// One record of a parsed command output, in field-declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, Field>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style scalar insert.
    pub fn with_text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_text(name, value);
        self
    }

    /// Builder-style list insert.
    pub fn with_list(mut self, name: &str, values: Vec<String>) -> Self {
        self.fields.insert(name.to_owned(), Field::List(values));
        self
    }

    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_owned(), Field::Text(value.into()));
    }

    /// Append to a list field, creating it if missing.
    pub fn push_list(&mut self, name: &str, value: impl Into<String>) {
        let entry = self
            .fields
            .entry(name.to_owned())
            .or_insert_with(|| Field::List(Vec::new()));
        if let Field::List(items) = entry {
            items.push(value.into());
        }
    }

    /// Scalar field value. Empty strings count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            Field::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// List field value; empty if missing or scalar.
    pub fn list(&self, name: &str) -> &[String] {
        match self.fields.get(name) {
            Some(Field::List(items)) => items,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Commands whose output the session layer knows how to tabulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// `show mac address-table`: `destination_address`, `type`, `vlan`, `destination_port`.
    MacAddressTable,
    /// `show etherchannel summary`: `group`, `po_name`, `po_status`, `protocol`,
    /// `interfaces` (list), `interfaces_status` (list).
    EtherchannelSummary,
    /// `show cdp neighbors detail`: `destination_host`, `management_ip`, `platform`,
    /// `capabilities`, `local_port`, `remote_port`.
    CdpNeighborsDetail,
}

impl Schema {
    pub const ALL: [Self; 3] = [
        Self::MacAddressTable,
        Self::EtherchannelSummary,
        Self::CdpNeighborsDetail,
    ];

    /// The canonical command string for this schema.
    pub fn command(self) -> &'static str {
        match self {
            Self::MacAddressTable => "show mac address-table",
            Self::EtherchannelSummary => "show etherchannel summary",
            Self::CdpNeighborsDetail => "show cdp neighbors detail",
        }
    }

    /// Find the schema for a command, tolerating extra whitespace and the
    /// `neighbor`/`neighbors` spelling difference.
    pub fn for_command(command: &str) -> Option<Self> {
        let words: Vec<&str> = command.split_whitespace().collect();
        let normalized = words.join(" ").to_lowercase();
        let normalized = normalized.replace("cdp neighbor detail", "cdp neighbors detail");
        Self::ALL.into_iter().find(|s| s.command() == normalized)
    }

    /// Tabulate raw command output.
    pub fn parse(self, output: &str) -> Vec<Row> {
        match self {
            Self::MacAddressTable => mac_table::parse(output),
            Self::EtherchannelSummary => etherchannel::parse(output),
            Self::CdpNeighborsDetail => cdp::parse(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_command_matches_variants() {
        assert_eq!(
            Schema::for_command("show  mac address-table"),
            Some(Schema::MacAddressTable)
        );
        assert_eq!(
            Schema::for_command("show cdp neighbor detail"),
            Some(Schema::CdpNeighborsDetail)
        );
        assert_eq!(
            Schema::for_command("SHOW ETHERCHANNEL SUMMARY"),
            Some(Schema::EtherchannelSummary)
        );
        assert_eq!(Schema::for_command("show version"), None);
    }

    #[test]
    fn row_accessors() {
        let mut row = Row::new().with_text("vlan", "20").with_text("empty", "");
        row.push_list("interfaces", "Gi1/0/1");
        row.push_list("interfaces", "Gi1/0/2");
        assert_eq!(row.text("vlan"), Some("20"));
        assert_eq!(row.text("empty"), None);
        assert_eq!(row.text("missing"), None);
        assert_eq!(row.list("interfaces"), ["Gi1/0/1", "Gi1/0/2"]);
        assert!(row.list("vlan").is_empty());
    }
}
