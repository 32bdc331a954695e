//! Cgroups v2 resource management.
//!
//! Provides interfaces for creating a per-invocation cgroup and setting
//! CPU bandwidth and memory limits via the unified hierarchy at
//! `/sys/fs/cgroup`. The launcher attaches *itself* before forking so the
//! limits inherit to the child; after the root switch the hierarchy is no
//! longer reachable from inside the jail.

pub mod cpu;
pub mod memory;

use std::path::PathBuf;

use cachot_common::error::{CachotError, Result};
use cachot_common::types::ResourceLimits;

/// Handle to the cgroup for one launcher invocation.
#[derive(Debug)]
pub struct CgroupManager {
    /// Path to this invocation's cgroup directory.
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    path: PathBuf,
}

#[cfg(target_os = "linux")]
impl CgroupManager {
    /// Creates (or reuses) the cgroup named `name` directly under the
    /// unified hierarchy root, mounting the hierarchy first if needed.
    ///
    /// Creation is idempotent: re-using a name resets the existing
    /// subgroup's limits on the next [`Self::apply_limits`] call instead
    /// of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy cannot be mounted or the cgroup
    /// directory cannot be created.
    pub fn create(name: &str) -> Result<Self> {
        ensure_hierarchy_mounted()?;
        let path = PathBuf::from(cachot_common::constants::CGROUP_V2_PATH).join(name);
        std::fs::create_dir_all(&path).map_err(|e| CachotError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "cgroup created");
        Ok(Self { path })
    }

    /// Applies resource limits to this cgroup.
    ///
    /// Writes the CPU bandwidth constraint unconditionally and the
    /// memory limit when one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are invalid or writing to cgroup
    /// control files fails.
    pub fn apply_limits(&self, limits: &ResourceLimits) -> Result<()> {
        limits.validate()?;
        cpu::set_cpu_max(&self.path, limits.cpu_quota, limits.cpu_period_micros)?;
        if let Some(bytes) = limits.memory_bytes {
            memory::set_memory_max(&self.path, bytes)?;
        }
        Ok(())
    }

    /// Adds a process to this cgroup by writing its PID.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `cgroup.procs` fails.
    pub fn add_process(&self, pid: u32) -> Result<()> {
        let procs_path = self.path.join("cgroup.procs");
        std::fs::write(&procs_path, pid.to_string()).map_err(|e| CachotError::Io {
            path: procs_path,
            source: e,
        })?;
        tracing::debug!(pid, "added process to cgroup");
        Ok(())
    }

    /// Attaches the calling process, pre-fork, so that every child
    /// spawned afterwards inherits the limits.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `cgroup.procs` fails.
    pub fn attach_self(&self) -> Result<()> {
        self.add_process(std::process::id())
    }

    /// Removes the cgroup directory.
    ///
    /// Only callable by a process outside the group: the kernel refuses
    /// to remove a cgroup that still contains processes, so the launcher
    /// cannot tear down the group it attached itself to.
    ///
    /// # Errors
    ///
    /// Returns an error if the cgroup directory cannot be removed.
    pub fn destroy(&self) -> Result<()> {
        if self.path.exists() {
            // Control files vanish with the group; remove_dir is the
            // only removal cgroupfs accepts.
            std::fs::remove_dir(&self.path).map_err(|e| CachotError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        }
        tracing::info!(path = %self.path.display(), "cgroup destroyed");
        Ok(())
    }

    /// Path of this cgroup's directory.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Makes sure the cgroup2 hierarchy is mounted at the well-known root.
///
/// Idempotent: an already-mounted hierarchy (detected via
/// `cgroup.controllers`, or an `EBUSY` from a racing mount) is not an
/// error.
#[cfg(target_os = "linux")]
fn ensure_hierarchy_mounted() -> Result<()> {
    use std::path::Path;

    let root = Path::new(cachot_common::constants::CGROUP_V2_PATH);
    if root.join("cgroup.controllers").exists() {
        return Ok(());
    }

    std::fs::create_dir_all(root).map_err(|e| CachotError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;
    match nix::mount::mount(
        Some("cgroup2"),
        root,
        Some("cgroup2"),
        nix::mount::MsFlags::empty(),
        None::<&str>,
    ) {
        Ok(()) => {
            tracing::info!(root = %root.display(), "cgroup2 hierarchy mounted");
            Ok(())
        }
        Err(nix::errno::Errno::EBUSY) => Ok(()),
        Err(e) => Err(CachotError::PermissionDenied {
            message: format!("mounting cgroup2 at {} failed: {e}", root.display()),
        }),
    }
}

#[cfg(not(target_os = "linux"))]
impl CgroupManager {
    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — cgroup management requires Linux.
    pub fn create(_name: &str) -> Result<Self> {
        Err(CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — cgroup management requires Linux.
    pub fn apply_limits(&self, _limits: &ResourceLimits) -> Result<()> {
        Err(CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — cgroup management requires Linux.
    pub fn add_process(&self, _pid: u32) -> Result<()> {
        Err(CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — cgroup management requires Linux.
    pub fn attach_self(&self) -> Result<()> {
        Err(CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — cgroup management requires Linux.
    pub fn destroy(&self) -> Result<()> {
        Err(CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }
}
