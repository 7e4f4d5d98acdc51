// ── Result export ──
//
// Flat CSV record of every located device after remediation.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::CoreError;
use crate::model::LocatedDevice;

/// Column order of the export file.
pub const EXPORT_HEADER: [&str; 5] = [
    "device",
    "switch_hostname",
    "switch_ip",
    "switchport",
    "current_vlan",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    device: String,
    switch_hostname: &'a str,
    switch_ip: String,
    switchport: &'a str,
    current_vlan: u16,
}

impl<'a> From<&'a LocatedDevice> for ExportRow<'a> {
    fn from(d: &'a LocatedDevice) -> Self {
        Self {
            device: d.mac.to_string(),
            switch_hostname: &d.switch_hostname,
            switch_ip: d.switch_address.to_string(),
            switchport: d.interface.as_str(),
            current_vlan: d.current_vlan.get(),
        }
    }
}

/// Operator-chosen name with the `.csv` extension added when missing.
pub fn with_csv_extension(name: &str) -> PathBuf {
    let name = name.trim();
    let has_ext = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if has_ext {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}.csv"))
    }
}

/// Write `located` as CSV to any writer. The header is always written.
pub fn export_to_writer<W: Write>(located: &[LocatedDevice], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(EXPORT_HEADER)?;
    for device in located {
        out.serialize(ExportRow::from(device))?;
    }
    out.flush()?;
    Ok(())
}

/// Write `located` to `path` in discovery order.
pub fn export(located: &[LocatedDevice], path: &Path) -> Result<(), CoreError> {
    let to_export_error = |reason: String| CoreError::Export {
        path: path.to_path_buf(),
        reason,
    };
    let file = std::fs::File::create(path).map_err(|e| to_export_error(e.to_string()))?;
    export_to_writer(located, file).map_err(|e| to_export_error(e.to_string()))?;
    info!(path = %path.display(), rows = located.len(), "results exported");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{InterfaceName, VlanId, normalize};
    use pretty_assertions::assert_eq;

    fn located() -> Vec<LocatedDevice> {
        vec![
            LocatedDevice {
                mac: normalize("00:1A:2B:3C:4D:5E").unwrap(),
                switch_address: "10.0.0.5".parse().unwrap(),
                switch_hostname: "acc-sw01".into(),
                interface: InterfaceName::new("Gi1/0/7"),
                current_vlan: VlanId::new(20).unwrap(),
            },
            LocatedDevice {
                mac: normalize("001a.2b3c.4d5f").unwrap(),
                switch_address: "10.0.0.6".parse().unwrap(),
                switch_hostname: "acc-sw02".into(),
                interface: InterfaceName::new("Gi2/0/1"),
                current_vlan: VlanId::new(10).unwrap(),
            },
        ]
    }

    #[test]
    fn empty_export_has_only_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        export(&[], &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "device,switch_hostname,switch_ip,switchport,current_vlan\n"
        );
    }

    #[test]
    fn rows_follow_discovery_order() {
        let mut buf = Vec::new();
        export_to_writer(&located(), &mut buf).unwrap();
        insta::assert_snapshot!(String::from_utf8(buf).unwrap(), @r"
        device,switch_hostname,switch_ip,switchport,current_vlan
        001a.2b3c.4d5e,acc-sw01,10.0.0.5,Gi1/0/7,20
        001a.2b3c.4d5f,acc-sw02,10.0.0.6,Gi2/0/1,10
        ");
    }

    #[test]
    fn unwritable_path_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.csv");
        assert!(matches!(
            export(&located(), &path),
            Err(CoreError::Export { .. })
        ));
    }

    #[test]
    fn csv_extension_added_once() {
        assert_eq!(with_csv_extension("results"), PathBuf::from("results.csv"));
        assert_eq!(with_csv_extension("results.CSV"), PathBuf::from("results.CSV"));
        assert_eq!(with_csv_extension(" moved "), PathBuf::from("moved.csv"));
    }
}
