use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs only depends on clap, so it can be compiled into the build script
// to render man pages and completion scripts for packaging.
#[path = "src/cli.rs"]
mod cli;

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "OUT_DIR not set by Cargo")
    })?);

    let man_dir = out_dir.join("man");
    std::fs::create_dir_all(&man_dir)?;
    write_manpages(&cli::Cli::command(), &man_dir)?;

    let completion_dir = out_dir.join("completions");
    std::fs::create_dir_all(&completion_dir)?;
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        clap_complete::generate_to(shell, &mut cli::Cli::command(), "vlanshift", &completion_dir)?;
    }
    Ok(())
}

/// One page per command, `vlanshift-config-init.1` style for nested ones.
fn write_manpages(cmd: &clap::Command, dir: &Path) -> io::Result<()> {
    let name = cmd.get_name().to_owned();
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut page)?;
    std::fs::write(dir.join(format!("{name}.1")), page)?;

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let renamed = sub.clone().name(format!("{name}-{}", sub.get_name()));
        write_manpages(&renamed, dir)?;
    }
    Ok(())
}
