//! # cachot — container launcher CLI
//!
//! Minimal single-process container launcher. Builds a filesystem jail,
//! applies cgroup limits, switches root, and runs a command in its own
//! PID namespace with the invoker's standard streams.

mod commands;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
        )
        .init();

    let cli = Cli::parse();
    let exit_code = commands::execute(cli)?;
    std::process::exit(exit_code)
}
