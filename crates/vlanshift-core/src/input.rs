// ── MAC list input ──

use std::io::Read;
use std::path::Path;

use indexmap::IndexSet;
use tracing::warn;

use crate::error::CoreError;
use crate::model::{MacAddress, normalize};

/// A record that did not parse as a MAC address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub line: u64,
    pub raw: String,
    pub reason: String,
}

/// Parsed input: distinct addresses in file order plus rejected records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacList {
    pub macs: IndexSet<MacAddress>,
    pub rejected: Vec<RejectedRecord>,
}

/// Parse one address per line, using the first comma-separated field.
/// Blank lines are ignored; malformed records are collected, not fatal.
pub fn parse_mac_list<R: Read>(reader: R) -> Result<MacList, CoreError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut list = MacList::default();
    for record in csv.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let Some(raw) = record.get(0).filter(|field| !field.is_empty()) else {
            continue;
        };
        match normalize(raw) {
            Ok(mac) => {
                list.macs.insert(mac);
            }
            Err(e) => {
                warn!(line, raw, "{e}");
                list.rejected.push(RejectedRecord {
                    line,
                    raw: raw.to_owned(),
                    reason: e.reason.to_owned(),
                });
            }
        }
    }
    Ok(list)
}

pub fn read_mac_list(path: &Path) -> Result<MacList, CoreError> {
    let file = std::fs::File::open(path).map_err(|e| CoreError::Input {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_mac_list(file)
}
