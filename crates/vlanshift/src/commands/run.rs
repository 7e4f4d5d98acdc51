//! `run`: the full pipeline. Discover, confirm, choose a VLAN, apply one
//! session per switch, then export the result.

use std::path::PathBuf;

use vlanshift_core::{
    ApplyReport, LocatedDevice, RemediationPlan, RemediationState, SshConnector, VlanId, apply,
    export, plan, remediation::access_vlan_commands, with_csv_extension,
};

use crate::cli::{GlobalOpts, RunArgs};
use crate::commands::discover::{discover, summarize};
use crate::commands::util;
use crate::config::{self, RunContext};
use crate::error::CliError;
use crate::output::{self, Reporter};

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let reporter = Reporter::new(global.color, global.quiet);
    let ctx = config::resolve_run_context(global, &args.discovery)?;

    let Some(discovery) = discover(&ctx, &reporter).await? else {
        return Ok(());
    };
    summarize(&discovery, &reporter);

    let mut located = discovery.outcome.located;
    if located.is_empty() {
        reporter.warn(format!(
            "No MAC addresses located; check {}",
            ctx.input.display()
        ));
        return Ok(());
    }

    // ── Decision points ──────────────────────────────────────────────
    reporter.rule();
    if !util::confirm(
        "Proceed with changing the VLAN for these devices?",
        args.yes,
    )? {
        reporter.step("Nothing changed.");
        return Ok(());
    }
    let vlan = choose_vlan(args.vlan, args.yes)?;
    reporter.step(format!("Assigning VLAN {vlan} to device interfaces"));
    reporter.rule();

    // ── Plan ─────────────────────────────────────────────────────────
    let plan = plan(&located, vlan);
    let already: Vec<usize> = plan.already_correct().collect();
    if !already.is_empty() {
        reporter.step(format!("Already assigned to VLAN {vlan}:"));
        for &i in &already {
            if let Some(device) = located.get(i) {
                reporter.item(device.mac);
            }
        }
    }

    if args.dry_run {
        print_dry_run(&plan, &located, &reporter);
        let out = output::render_devices(global.output, &located, &plan.states)?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    // ── Apply ────────────────────────────────────────────────────────
    let report = if plan.is_noop() {
        ApplyReport {
            states: plan.states.clone(),
            ..ApplyReport::default()
        }
    } else {
        apply_plan(&plan, &mut located, &ctx, args.session_log.as_ref(), &reporter).await?
    };

    let out = output::render_devices(global.output, &located, &report.states)?;
    output::print_output(&out, global.quiet);

    // ── Export ───────────────────────────────────────────────────────
    reporter.rule();
    let path = export_results(&located, args.output_file, &reporter)?;
    reporter.success(format!("Saved results to {}", path.display()));

    if let Some(err) = report.aborted {
        return Err(err.into());
    }
    if report.failures.is_empty() {
        reporter.success(format!("All located devices are now assigned to VLAN {vlan}"));
    }
    Ok(())
}

/// Take the preset VLAN (or ask), then confirm it. Declining asks again.
fn choose_vlan(preset: Option<u16>, yes: bool) -> Result<VlanId, CliError> {
    let mut preset = preset;
    loop {
        let vlan = match preset.take() {
            Some(id) => VlanId::new(id).map_err(|e| CliError::Validation {
                field: "vlan".into(),
                reason: e.to_string(),
            })?,
            None => util::prompt_vlan()?,
        };
        if util::confirm(&format!("You've chosen VLAN {vlan}; is this correct?"), yes)? {
            return Ok(vlan);
        }
    }
}

fn print_dry_run(plan: &RemediationPlan, located: &[LocatedDevice], reporter: &Reporter) {
    reporter.step(format!(
        "Dry run: {} devices on {} switches would change",
        plan.pending_count(),
        plan.groups.len()
    ));
    for group in &plan.groups {
        reporter.step(format!("{} ({})", group.hostname, group.address));
        for device in group.devices.iter().filter_map(|&i| located.get(i)) {
            for line in access_vlan_commands(device, plan.desired_vlan) {
                reporter.item(line);
            }
        }
        reporter.item("write memory");
    }
}

async fn apply_plan(
    plan: &RemediationPlan,
    located: &mut [LocatedDevice],
    ctx: &RunContext,
    session_log: Option<&PathBuf>,
    reporter: &Reporter,
) -> Result<ApplyReport, CliError> {
    let mut connector = SshConnector::new(&ctx.session);
    if let Some(dir) = session_log {
        std::fs::create_dir_all(dir)?;
        connector = connector.with_session_log(dir.clone());
    }

    reporter.step(format!("Assigning these devices to VLAN {}:", plan.desired_vlan));
    for device in plan.groups.iter().flat_map(|g| &g.devices).filter_map(|&i| located.get(i)) {
        reporter.item(device.mac);
    }

    let spinner = util::spinner(
        format!("Applying changes on {} switches", plan.groups.len()),
        reporter.quiet(),
    );
    let report = apply(plan, located, &connector).await;
    spinner.finish_and_clear();

    for failure in &report.failures {
        reporter.warn(format!(
            "{} on {} was not changed: {}",
            failure.mac, failure.switch_address, failure.reason
        ));
    }
    for unsaved in &report.unsaved {
        reporter.warn(format!(
            "Configuration on {} ({}) changed but was NOT saved: {}",
            unsaved.hostname, unsaved.address, unsaved.reason
        ));
    }
    let applied = report
        .states
        .iter()
        .filter(|s| **s == RemediationState::Applied)
        .count();
    if applied > 0 {
        reporter.success(format!(
            "Changed {applied} devices using {} sessions",
            report.sessions
        ));
    }
    Ok(report)
}

/// Write the CSV, asking for another name while the chosen one fails.
fn export_results(
    located: &[LocatedDevice],
    output_file: Option<String>,
    reporter: &Reporter,
) -> Result<PathBuf, CliError> {
    let mut name = match output_file {
        Some(name) => name,
        None => util::prompt_text(
            "Name for the results file",
            Some("results"),
            "results file name",
            "--output-file",
        )?,
    };
    loop {
        let path = with_csv_extension(&name);
        match export(located, &path) {
            Ok(()) => return Ok(path),
            Err(e) if util::is_interactive() => {
                reporter.warn(&e);
                name = util::prompt_text(
                    "Choose another file name",
                    None,
                    "results file name",
                    "--output-file",
                )?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
