//! Command handlers: bridge CLI args -> core pipeline -> output formatting.

pub mod config_cmd;
pub mod discover;
pub mod locate;
pub mod run;
pub mod util;

use clap::CommandFactory;

use crate::cli::{Cli, Command, CompletionsArgs, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run(args) => run::handle(args, global).await,
        Command::Locate(args) => locate::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            completions(&args);
            Ok(())
        }
    }
}

fn completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "vlanshift", &mut std::io::stdout());
}
