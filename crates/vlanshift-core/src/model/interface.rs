// ── Port, interface and VLAN identifiers ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Abbreviated IOS interface prefixes and their long forms.
///
/// Longest abbreviations first so `Twe` wins over `Tw`.
const INTERFACE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("twe", "TwentyFiveGigE"),
    ("tw", "TwoGigabitEthernet"),
    ("te", "TenGigabitEthernet"),
    ("gi", "GigabitEthernet"),
    ("fa", "FastEthernet"),
    ("fi", "FiveGigabitEthernet"),
    ("fo", "FortyGigabitEthernet"),
    ("hu", "HundredGigE"),
    ("eth", "Ethernet"),
    ("et", "Ethernet"),
    ("po", "Port-channel"),
];

/// The port column of a forwarding table: a physical interface or an
/// aggregate (`Po1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortName(String);

impl PortName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this names a link aggregate rather than a physical port.
    pub fn is_aggregate(&self) -> bool {
        expand_prefix(&self.0).starts_with("Port-channel")
    }

    /// Same-port comparison across naming conventions (`Po1` == `Port-channel1`).
    pub fn matches(&self, other: &Self) -> bool {
        expand_prefix(&self.0).eq_ignore_ascii_case(&expand_prefix(&other.0))
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A physical interface name, in whichever form the device printed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceName(String);

impl InterfaceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Long form as used by CDP (`Te1/1/1` -> `TenGigabitEthernet1/1/1`).
    pub fn long_form(&self) -> String {
        expand_prefix(&self.0)
    }

    /// Same-interface comparison across short and long naming.
    pub fn matches(&self, other: &Self) -> bool {
        self.long_form().eq_ignore_ascii_case(&other.long_form())
    }
}

impl From<PortName> for InterfaceName {
    fn from(port: PortName) -> Self {
        Self(port.0)
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn expand_prefix(name: &str) -> String {
    let split = name
        .find(|c: char| !c.is_ascii_alphabetic() && c != '-')
        .unwrap_or(name.len());
    let (prefix, rest) = name.split_at(split);
    let lower = prefix.to_ascii_lowercase();
    INTERFACE_ABBREVIATIONS
        .iter()
        .find(|(short, _)| *short == lower)
        .map_or_else(|| name.to_owned(), |(_, long)| format!("{long}{rest}"))
}

// ── VlanId ──────────────────────────────────────────────────────────

/// Rejected VLAN identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid VLAN ID (expected 1-4094)")]
pub struct InvalidVlan {
    pub input: String,
}

/// 802.1Q VLAN identifier usable as an access VLAN (1–4094).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VlanId(u16);

impl VlanId {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    pub fn new(id: u16) -> Result<Self, InvalidVlan> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(InvalidVlan {
                input: id.to_string(),
            })
        }
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for VlanId {
    type Err = InvalidVlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u16>()
            .ok()
            .and_then(|id| Self::new(id).ok())
            .ok_or_else(|| InvalidVlan {
                input: trimmed.to_owned(),
            })
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn expands_short_interface_names() {
        let cases = [
            ("Te1/1/1", "TenGigabitEthernet1/1/1"),
            ("Gi1/0/24", "GigabitEthernet1/0/24"),
            ("Fa0/1", "FastEthernet0/1"),
            ("Tw1/0/3", "TwoGigabitEthernet1/0/3"),
            ("Twe1/0/1", "TwentyFiveGigE1/0/1"),
            ("Hu1/0/49", "HundredGigE1/0/49"),
            ("Eth1/1", "Ethernet1/1"),
            ("TenGigabitEthernet1/1/1", "TenGigabitEthernet1/1/1"),
        ];
        for (short, long) in cases {
            assert_eq!(InterfaceName::new(short).long_form(), long);
        }
    }

    #[test]
    fn interface_matches_across_forms() {
        let short = InterfaceName::new("Te1/1/1");
        assert!(short.matches(&InterfaceName::new("TenGigabitEthernet1/1/1")));
        assert!(!short.matches(&InterfaceName::new("TenGigabitEthernet1/1/11")));
    }

    #[test]
    fn aggregate_detection() {
        assert!(PortName::new("Po1").is_aggregate());
        assert!(PortName::new("Port-channel12").is_aggregate());
        assert!(!PortName::new("Gi1/0/1").is_aggregate());
        assert!(!PortName::new("CPU").is_aggregate());
        assert!(PortName::new("Po1").matches(&PortName::new("Port-channel1")));
    }

    #[test]
    fn vlan_bounds() {
        assert_eq!("20".parse::<VlanId>().unwrap().get(), 20);
        assert_eq!(" 4094 ".parse::<VlanId>().unwrap().get(), 4094);
        assert!("0".parse::<VlanId>().is_err());
        assert!("4095".parse::<VlanId>().is_err());
        assert!("All".parse::<VlanId>().is_err());
        assert!("".parse::<VlanId>().is_err());
    }
}
