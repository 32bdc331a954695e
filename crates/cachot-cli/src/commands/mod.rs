//! CLI command definitions and dispatch.

pub mod run;

use clap::{Parser, Subcommand};

/// Cachot — minimal single-process container launcher.
#[derive(Parser, Debug)]
#[command(name = "cachot", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the jail, apply limits, and run a command inside it.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// Returns the exit code the launcher process should terminate with.
///
/// # Errors
///
/// Returns an error if the command execution fails during setup.
pub fn execute(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Run(args) => run::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_parses_trailing_command() {
        let cli = Cli::try_parse_from(["cachot", "run", "sh", "-c", "echo hi"]).expect("parse");
        let Command::Run(args) = cli.command;
        assert_eq!(args.command, ["sh", "-c", "echo hi"]);
    }

    #[test]
    fn run_flags_come_before_the_command() {
        let cli = Cli::try_parse_from([
            "cachot",
            "run",
            "--cpu-quota",
            "max",
            "--root",
            "/tmp/elsewhere",
            "sleep",
            "1",
        ])
        .expect("parse");
        let Command::Run(args) = cli.command;
        assert_eq!(args.cpu_quota.as_deref(), Some("max"));
        assert_eq!(args.root, Some(std::path::PathBuf::from("/tmp/elsewhere")));
        assert_eq!(args.command, ["sleep", "1"]);
    }

    #[test]
    fn run_requires_a_command() {
        assert!(Cli::try_parse_from(["cachot", "run"]).is_err());
    }
}
