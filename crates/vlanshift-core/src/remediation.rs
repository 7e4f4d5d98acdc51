// ── Access-VLAN remediation ──
//
// Planning is pure: it classifies each located device against the desired
// VLAN and groups pending changes by switch. Applying walks the groups with
// one session and at most one configuration save per switch.

use std::net::IpAddr;

use indexmap::IndexMap;
use serde::Serialize;
use strum::Display;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::{LocatedDevice, MacAddress, VlanId};
use crate::session::{Connector, DeviceSession, finish};

/// Lifecycle of one located device during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RemediationState {
    Discovered,
    AlreadyCorrect,
    PendingChange,
    Applied,
    Failed,
}

/// Pending changes on one switch, as indices into the located list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchGroup {
    pub address: IpAddr,
    pub hostname: String,
    pub devices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationPlan {
    pub desired_vlan: VlanId,
    /// Classification of every located device, by index.
    pub states: Vec<RemediationState>,
    /// Switches with at least one pending change, in discovery order.
    pub groups: Vec<SwitchGroup>,
}

impl RemediationPlan {
    pub fn pending_count(&self) -> usize {
        self.groups.iter().map(|g| g.devices.len()).sum()
    }

    pub fn already_correct(&self) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == RemediationState::AlreadyCorrect)
            .map(|(i, _)| i)
    }

    /// Nothing needs to change anywhere.
    pub fn is_noop(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Classify `located` against `desired` and batch pending changes per switch.
pub fn plan(located: &[LocatedDevice], desired: VlanId) -> RemediationPlan {
    let mut groups: IndexMap<IpAddr, SwitchGroup> = IndexMap::new();
    let states = located
        .iter()
        .enumerate()
        .map(|(index, device)| {
            if device.current_vlan == desired {
                return RemediationState::AlreadyCorrect;
            }
            groups
                .entry(device.switch_address)
                .or_insert_with(|| SwitchGroup {
                    address: device.switch_address,
                    hostname: device.switch_hostname.clone(),
                    devices: Vec::new(),
                })
                .devices
                .push(index);
            RemediationState::PendingChange
        })
        .collect();

    RemediationPlan {
        desired_vlan: desired,
        states,
        groups: groups.into_values().collect(),
    }
}

/// A device whose change was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFailure {
    pub mac: MacAddress,
    pub switch_address: IpAddr,
    pub reason: String,
}

/// A switch whose running configuration changed but was not saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedSwitch {
    pub address: IpAddr,
    pub hostname: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Final state of every located device, by index.
    pub states: Vec<RemediationState>,
    pub failures: Vec<DeviceFailure>,
    pub unsaved: Vec<UnsavedSwitch>,
    /// Sessions opened.
    pub sessions: usize,
    /// Set when an authentication failure stopped the apply phase early.
    pub aborted: Option<CoreError>,
}

impl ApplyReport {
    pub fn applied(&self) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == RemediationState::Applied)
            .map(|(i, _)| i)
    }
}

/// Configuration lines that set the access VLAN on one interface.
pub fn access_vlan_commands(device: &LocatedDevice, vlan: VlanId) -> Vec<String> {
    vec![
        format!("interface {}", device.interface),
        format!("switchport access vlan {vlan}"),
    ]
}

/// Push `plan` to the network.
///
/// Each device's `current_vlan` is updated as soon as its own change
/// succeeds. A rejected change fails only that device. An unreachable switch,
/// or one whose session breaks mid-group, fails the rest of its group and is
/// not saved. A failed save is reported without touching device state. Only
/// rejected credentials stop the whole phase.
pub async fn apply<C: Connector>(
    plan: &RemediationPlan,
    located: &mut [LocatedDevice],
    connector: &C,
) -> ApplyReport {
    let mut report = ApplyReport {
        states: plan.states.clone(),
        ..ApplyReport::default()
    };

    for group in &plan.groups {
        if report.aborted.is_some() {
            fail_devices(&mut report, group, &group.devices, located, "apply phase aborted");
            continue;
        }

        let mut session = match connector.open(&group.address.to_string()).await {
            Ok(session) => session,
            Err(e) => {
                warn!(address = %group.address, error = %e, "cannot reach target switch");
                fail_devices(&mut report, group, &group.devices, located, &e.to_string());
                if e.is_authentication() {
                    report.aborted = Some(e);
                }
                continue;
            }
        };
        report.sessions += 1;

        if !session.is_privileged() {
            warn!(switch = %group.hostname, "not in privileged EXEC mode; skipping");
            fail_devices(
                &mut report,
                group,
                &group.devices,
                located,
                "session is not in privileged EXEC mode (enable is required)",
            );
            finish(session).await;
            continue;
        }

        let mut changed = 0usize;
        let mut broken = None;
        for (position, &index) in group.devices.iter().enumerate() {
            let Some(device) = located.get_mut(index) else {
                continue;
            };
            let commands = access_vlan_commands(device, plan.desired_vlan);
            match session.apply_config(&commands).await {
                Ok(()) => {
                    info!(mac = %device.mac, switch = %group.hostname, interface = %device.interface, vlan = %plan.desired_vlan, "access VLAN changed");
                    device.current_vlan = plan.desired_vlan;
                    set_state(&mut report, index, RemediationState::Applied);
                    changed += 1;
                }
                Err(e @ CoreError::CommandFailed { .. }) => {
                    warn!(mac = %device.mac, error = %e, "change rejected");
                    report.failures.push(DeviceFailure {
                        mac: device.mac,
                        switch_address: group.address,
                        reason: e.to_string(),
                    });
                    set_state(&mut report, index, RemediationState::Failed);
                }
                Err(e) => {
                    // The exchange state is unknown; nothing more goes over this session.
                    warn!(switch = %group.hostname, error = %e, "session lost during changes");
                    broken = Some((position, e));
                    break;
                }
            }
        }

        if let Some((position, e)) = broken {
            let rest = group.devices.get(position..).unwrap_or_default();
            fail_devices(&mut report, group, rest, located, &e.to_string());
            if e.is_authentication() {
                report.aborted = Some(e);
            }
        } else if changed > 0 {
            if let Err(e) = session.persist().await {
                warn!(address = %group.address, error = %e, "configuration not saved");
                report.unsaved.push(UnsavedSwitch {
                    address: group.address,
                    hostname: group.hostname.clone(),
                    reason: e.to_string(),
                });
            } else {
                info!(switch = %group.hostname, "configuration saved");
            }
        }
        finish(session).await;
    }
    report
}

fn set_state(report: &mut ApplyReport, index: usize, state: RemediationState) {
    if let Some(slot) = report.states.get_mut(index) {
        *slot = state;
    }
}

fn fail_devices(
    report: &mut ApplyReport,
    group: &SwitchGroup,
    devices: &[usize],
    located: &[LocatedDevice],
    reason: &str,
) {
    for &index in devices {
        if let Some(device) = located.get(index) {
            report.failures.push(DeviceFailure {
                mac: device.mac,
                switch_address: group.address,
                reason: reason.to_owned(),
            });
        }
        set_state(report, index, RemediationState::Failed);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{InterfaceName, normalize};
    use crate::session::mock::{Device, MockConnector};
    use pretty_assertions::assert_eq;

    fn device(mac: &str, switch: &str, interface: &str, vlan: u16) -> LocatedDevice {
        LocatedDevice {
            mac: normalize(mac).unwrap(),
            switch_address: switch.parse().unwrap(),
            switch_hostname: format!("sw-{switch}"),
            interface: InterfaceName::new(interface),
            current_vlan: VlanId::new(vlan).unwrap(),
        }
    }

    fn vlan(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    fn switch() -> Device {
        Device {
            hostname: "acc".into(),
            ..Device::default()
        }
    }

    #[test]
    fn device_already_on_vlan_is_not_planned() {
        let located = vec![device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 20)];
        let plan = plan(&located, vlan(20));
        assert_eq!(plan.states, vec![RemediationState::AlreadyCorrect]);
        assert!(plan.is_noop());
        assert_eq!(plan.already_correct().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn planning_is_pure_and_grouped_by_switch() {
        let located = vec![
            device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10),
            device("0011.2233.4402", "10.0.0.6", "Gi1/0/2", 10),
            device("0011.2233.4403", "10.0.0.5", "Gi1/0/3", 10),
        ];
        let first = plan(&located, vlan(20));
        assert_eq!(first, plan(&located, vlan(20)));
        assert_eq!(first.groups.len(), 2);
        assert_eq!(first.groups[0].devices, vec![0, 2]);
        assert_eq!(first.groups[1].devices, vec![1]);
        assert_eq!(first.pending_count(), 3);
    }

    #[tokio::test]
    async fn already_correct_device_issues_nothing() {
        let connector = MockConnector::default().with_device("10.0.0.5", switch());
        let mut located = vec![device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 20)];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert_eq!(report.sessions, 0);
        let journal = connector.journal.borrow();
        assert!(journal.opened.is_empty());
        assert!(journal.config.is_empty());
        assert!(journal.persisted.is_empty());
    }

    #[tokio::test]
    async fn one_session_and_one_save_per_switch() {
        let connector = MockConnector::default().with_device("10.0.0.5", switch());
        let mut located = vec![
            device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10),
            device("0011.2233.4402", "10.0.0.5", "Gi1/0/2", 30),
        ];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert_eq!(report.sessions, 1);
        assert!(located.iter().all(|d| d.current_vlan == vlan(20)));
        assert_eq!(report.applied().count(), 2);
        let journal = connector.journal.borrow();
        assert_eq!(journal.opened, vec!["10.0.0.5"]);
        assert_eq!(journal.persisted, vec!["10.0.0.5"]);
        assert_eq!(journal.closed, vec!["10.0.0.5"]);
        assert_eq!(
            journal.config[0].1,
            vec!["interface Gi1/0/1", "switchport access vlan 20"]
        );
    }

    #[tokio::test]
    async fn rejected_change_fails_only_that_device() {
        let mut target = switch();
        target.reject.insert("interface Gi1/0/1".into());
        let connector = MockConnector::default().with_device("10.0.0.5", target);
        let mut located = vec![
            device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10),
            device("0011.2233.4402", "10.0.0.5", "Gi1/0/2", 10),
        ];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert_eq!(
            report.states,
            vec![RemediationState::Failed, RemediationState::Applied]
        );
        assert_eq!(located[0].current_vlan, vlan(10));
        assert_eq!(located[1].current_vlan, vlan(20));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(connector.journal.borrow().persisted.len(), 1);
    }

    #[tokio::test]
    async fn failed_save_keeps_applied_state() {
        let mut target = switch();
        target.fail_persist = true;
        let connector = MockConnector::default().with_device("10.0.0.5", target);
        let mut located = vec![device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10)];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert_eq!(report.states, vec![RemediationState::Applied]);
        assert_eq!(located[0].current_vlan, vlan(20));
        assert_eq!(report.unsaved.len(), 1);
        assert_eq!(report.unsaved[0].address.to_string(), "10.0.0.5");
    }

    #[tokio::test]
    async fn unreachable_switch_fails_group_and_continues() {
        let connector = MockConnector::default()
            .unreachable("10.0.0.5")
            .with_device("10.0.0.6", switch());
        let mut located = vec![
            device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10),
            device("0011.2233.4402", "10.0.0.6", "Gi1/0/2", 10),
        ];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert_eq!(
            report.states,
            vec![RemediationState::Failed, RemediationState::Applied]
        );
        assert!(report.aborted.is_none());
    }

    #[tokio::test]
    async fn authentication_failure_aborts_remaining_groups() {
        let connector = MockConnector::default()
            .deny_auth("10.0.0.5")
            .with_device("10.0.0.6", switch());
        let mut located = vec![
            device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10),
            device("0011.2233.4402", "10.0.0.6", "Gi1/0/2", 10),
        ];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert!(report.aborted.as_ref().unwrap().is_authentication());
        assert_eq!(report.states, vec![RemediationState::Failed; 2]);
        assert!(connector.journal.borrow().opened.is_empty());
    }

    #[tokio::test]
    async fn timed_out_change_abandons_switch() {
        let mut target = switch();
        target.stall.insert("interface Gi1/0/1".into());
        let connector = MockConnector::default()
            .with_device("10.0.0.5", target)
            .with_device("10.0.0.6", switch());
        let mut located = vec![
            device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10),
            device("0011.2233.4402", "10.0.0.5", "Gi1/0/2", 10),
            device("0011.2233.4403", "10.0.0.6", "Gi1/0/3", 10),
        ];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert_eq!(
            report.states,
            vec![
                RemediationState::Failed,
                RemediationState::Failed,
                RemediationState::Applied
            ]
        );
        assert_eq!(located[1].current_vlan, vlan(10));
        assert_eq!(report.failures.len(), 2);
        assert!(report.aborted.is_none());
        let journal = connector.journal.borrow();
        let pushed_to_first: Vec<_> = journal
            .config
            .iter()
            .filter(|(address, _)| address == "10.0.0.5")
            .collect();
        assert_eq!(pushed_to_first.len(), 1);
        assert_eq!(journal.persisted, vec!["10.0.0.6".to_owned()]);
        assert_eq!(journal.opened, journal.closed);
    }

    #[tokio::test]
    async fn unprivileged_session_is_refused() {
        let mut target = switch();
        target.unprivileged = true;
        let connector = MockConnector::default().with_device("10.0.0.5", target);
        let mut located = vec![device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10)];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert_eq!(report.states, vec![RemediationState::Failed]);
        assert!(report.failures[0].reason.contains("privileged"));
        let journal = connector.journal.borrow();
        assert!(journal.config.is_empty());
        assert!(journal.persisted.is_empty());
        assert_eq!(journal.opened, journal.closed);
    }

    #[tokio::test]
    async fn local_failure_on_one_switch_does_not_abort() {
        let connector = MockConnector::default()
            .log_failure("10.0.0.5")
            .with_device("10.0.0.6", switch());
        let mut located = vec![
            device("0011.2233.4401", "10.0.0.5", "Gi1/0/1", 10),
            device("0011.2233.4402", "10.0.0.6", "Gi1/0/2", 10),
        ];
        let plan = plan(&located, vlan(20));

        let report = apply(&plan, &mut located, &connector).await;

        assert!(report.aborted.is_none());
        assert_eq!(
            report.states,
            vec![RemediationState::Failed, RemediationState::Applied]
        );
    }

    #[test]
    fn state_names_are_kebab_case() {
        assert_eq!(RemediationState::AlreadyCorrect.to_string(), "already-correct");
    }
}
