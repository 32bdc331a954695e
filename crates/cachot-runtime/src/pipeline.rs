//! The typed launch pipeline.
//!
//! `Init → JailBuilt → LimitsApplied → RootSwitched → Running` from the
//! launcher's state machine, with each transition consuming the previous
//! stage's witness value. Resource limits are applied on the host side
//! before the root switch because the cgroup hierarchy is unreachable
//! from inside the jail, and the limiter must attach the launcher before
//! the fork so the child inherits its cgroup.

use std::path::{Path, PathBuf};

use cachot_common::config::LauncherConfig;
use cachot_common::error::Result;
use cachot_common::types::{JailSpec, ResourceLimits, RunResult};
use cachot_core::cgroup::CgroupManager;
use cachot_core::env::{HostEnv, ProcessEnv};
use cachot_core::jail;

use crate::process::{self, CommandSpec};

/// Witness that the jail filesystem has been materialized.
#[derive(Debug)]
pub struct JailBuilt {
    root: PathBuf,
}

/// Witness that the launcher sits inside a limited cgroup.
#[derive(Debug)]
pub struct LimitsApplied {
    root: PathBuf,
}

/// Witness that the process root now points into the jail.
///
/// From here on no host-side absolute path may be referenced again in
/// this process.
#[derive(Debug)]
pub struct RootSwitched {
    _jail: (),
}

/// Builds the jail and yields the first pipeline witness.
///
/// # Errors
///
/// Returns an error if the jail cannot be built.
pub fn build_jail(spec: &JailSpec) -> Result<JailBuilt> {
    jail::build_jail(spec)?;
    Ok(JailBuilt {
        root: spec.root.clone(),
    })
}

impl JailBuilt {
    /// Jail root this stage certified.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the cgroup, writes the limits, and attaches the launcher.
    ///
    /// Runs host-side, before the root switch hides the cgroup
    /// filesystem; attaching pre-fork makes the child inherit the group.
    ///
    /// # Errors
    ///
    /// Returns an error if the cgroup cannot be created or any control
    /// file write fails; resource limiting is a security boundary, not
    /// best-effort.
    pub fn apply_limits(self, limits: &ResourceLimits) -> Result<LimitsApplied> {
        let cgroup = CgroupManager::create(&limits.cgroup_name)?;
        cgroup.apply_limits(limits)?;
        cgroup.attach_self()?;
        Ok(LimitsApplied { root: self.root })
    }
}

impl LimitsApplied {
    /// Switches the process root into the jail.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment mutation fails; the process
    /// must not launch partially isolated.
    pub fn enter(self, env: &mut dyn ProcessEnv) -> Result<RootSwitched> {
        jail::enter::enter_jail(env, &self.root)?;
        Ok(RootSwitched { _jail: () })
    }
}

impl RootSwitched {
    /// Spawns the target command and waits for its termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the spawn or wait syscalls fail. An
    /// unresolvable target is not an error; it is reported as a
    /// launch-failed [`RunResult`].
    pub fn launch(self, spec: &CommandSpec) -> Result<RunResult> {
        process::launch(spec)
    }
}

/// Runs the whole pipeline against the real host environment.
///
/// # Errors
///
/// Returns an error if any setup stage fails.
pub fn run(config: &LauncherConfig, argv: Vec<String>) -> Result<RunResult> {
    let jail_spec = JailSpec {
        root: config.jail_root.clone(),
        dependencies: config.dependencies.clone(),
    };
    let built = build_jail(&jail_spec)?;
    let limited = built.apply_limits(&config.limits)?;
    let switched = limited.enter(&mut HostEnv)?;
    switched.launch(&CommandSpec::new(argv))
}
