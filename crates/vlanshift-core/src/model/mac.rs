// ── MAC address ──
//
// Every MAC entering the pipeline (operator input and device tables alike)
// goes through `normalize`, so comparisons are always on the six octets.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A MAC address record that does not decode to exactly six octets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid MAC address: {reason}")]
pub struct InvalidAddress {
    pub input: String,
    pub reason: &'static str,
}

/// Six-octet hardware address.
///
/// Displays in Cisco dotted form (`0011.2233.4455`), the same form switch
/// forwarding tables print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

/// Parse a MAC address in colon, dash, dotted-triplet, or bare-hex notation.
///
/// Case and surrounding whitespace are ignored. Mixed delimiters are rejected.
pub fn normalize(raw: &str) -> Result<MacAddress, InvalidAddress> {
    let input = raw.trim();
    let invalid = |reason| InvalidAddress {
        input: input.to_owned(),
        reason,
    };

    if input.is_empty() {
        return Err(invalid("empty"));
    }

    let delimiters: Vec<char> = [':', '-', '.']
        .into_iter()
        .filter(|d| input.contains(*d))
        .collect();

    let hex = match delimiters.as_slice() {
        [] => {
            if input.len() != 12 {
                return Err(invalid("expected 12 hex digits"));
            }
            input.to_owned()
        }
        [d @ (':' | '-')] => {
            let groups: Vec<&str> = input.split(*d).collect();
            if groups.len() != 6 || groups.iter().any(|g| g.is_empty() || g.len() > 2) {
                return Err(invalid("expected six groups of two hex digits"));
            }
            groups.iter().map(|g| format!("{g:0>2}")).collect()
        }
        ['.'] => {
            let groups: Vec<&str> = input.split('.').collect();
            if groups.len() != 3 || groups.iter().any(|g| g.len() != 4) {
                return Err(invalid("expected three groups of four hex digits"));
            }
            groups.concat()
        }
        _ => return Err(invalid("mixed delimiters")),
    };

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("non-hex characters"));
    }

    let mut octets = [0u8; 6];
    for (octet, pair) in octets.iter_mut().zip(hex.as_bytes().chunks(2)) {
        let pair = std::str::from_utf8(pair).map_err(|_| invalid("non-hex characters"))?;
        *octet = u8::from_str_radix(pair, 16).map_err(|_| invalid("non-hex characters"))?;
    }
    Ok(MacAddress::new(octets))
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}{b:02x}.{c:02x}{d:02x}.{e:02x}{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
