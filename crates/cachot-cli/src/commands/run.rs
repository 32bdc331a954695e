//! `cachot run` — run a command inside the jail.

use std::path::PathBuf;

use clap::Args;

use cachot_common::config::LauncherConfig;
use cachot_common::types::{CpuQuota, ResourceLimits, TerminationCause, parse_memory_size};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command to run inside the container (program plus arguments).
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Jail root directory on the host.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Cgroup name (defaults to a unique per-invocation name).
    #[arg(long)]
    pub cgroup: Option<String>,

    /// CPU quota in microseconds per period, or "max" for unlimited.
    #[arg(long)]
    pub cpu_quota: Option<String>,

    /// CPU bandwidth period in microseconds.
    #[arg(long)]
    pub cpu_period: Option<u64>,

    /// Memory limit, e.g. "128MiB" or a plain byte count.
    #[arg(long)]
    pub memory: Option<String>,

    /// Path to a JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Executes the `run` command and returns the launcher's exit code.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any setup stage
/// of the pipeline fails.
pub fn execute(args: RunArgs) -> anyhow::Result<i32> {
    let mut config = match &args.config {
        Some(path) => LauncherConfig::load(path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => LauncherConfig {
            limits: ResourceLimits {
                cgroup_name: ResourceLimits::unique_cgroup_name(),
                ..ResourceLimits::default()
            },
            ..LauncherConfig::default()
        },
    };

    if let Some(root) = args.root {
        config.jail_root = root;
    }
    if let Some(name) = args.cgroup {
        config.limits.cgroup_name = name;
    }
    if let Some(quota) = &args.cpu_quota {
        config.limits.cpu_quota = parse_cpu_quota(quota)?;
    }
    if let Some(period) = args.cpu_period {
        config.limits.cpu_period_micros = period;
    }
    if let Some(memory) = &args.memory {
        config.limits.memory_bytes = Some(
            parse_memory_size(memory)
                .ok_or_else(|| anyhow::anyhow!("invalid memory size: {memory}"))?,
        );
    }

    let result = cachot_runtime::pipeline::run(&config, args.command)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    match result.cause {
        TerminationCause::Exited => {
            tracing::info!(code = result.exit_code, "command exited");
        }
        TerminationCause::Signaled => {
            tracing::warn!(code = result.exit_code, "command killed by signal");
        }
        TerminationCause::LaunchFailed => {
            tracing::error!(code = result.exit_code, "command could not be started");
        }
    }
    Ok(result.exit_code)
}

fn parse_cpu_quota(s: &str) -> anyhow::Result<CpuQuota> {
    if s == "max" {
        return Ok(CpuQuota::Max);
    }
    s.parse::<u64>()
        .map(CpuQuota::Micros)
        .map_err(|_| anyhow::anyhow!("invalid CPU quota (expected microseconds or \"max\"): {s}"))
}
