//! `locate`: discovery only; prints where each device is, changes nothing.

use crate::cli::{GlobalOpts, LocateArgs};
use crate::commands::discover::{discover, summarize};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Reporter};

pub async fn handle(args: LocateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let reporter = Reporter::new(global.color, global.quiet);
    let ctx = config::resolve_run_context(global, &args.discovery)?;

    let Some(discovery) = discover(&ctx, &reporter).await? else {
        return Ok(());
    };
    summarize(&discovery, &reporter);

    let out = output::render_devices(global.output, &discovery.outcome.located, &[])?;
    output::print_output(&out, global.quiet);
    Ok(())
}
