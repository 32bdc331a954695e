//! Domain primitive types used across the Cachot workspace.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CachotError, Result};

/// What a jail dependency is, which decides where it lands inside the jail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// A whole directory tree, copied recursively under the jail root.
    Tree,
    /// A single executable, copied into the jail's binary directory.
    Binary,
    /// A shared library, copied into `lib` or `lib64` depending on the
    /// source location.
    SharedLibrary,
}

/// One host path that must be present inside the jail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Absolute host path of the source.
    pub source: PathBuf,
    /// How the source is staged into the jail.
    pub kind: DependencyKind,
}

impl Dependency {
    /// Creates a whole-tree dependency.
    #[must_use]
    pub fn tree(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            kind: DependencyKind::Tree,
        }
    }

    /// Creates a single-binary dependency.
    #[must_use]
    pub fn binary(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            kind: DependencyKind::Binary,
        }
    }

    /// Creates a shared-library dependency.
    #[must_use]
    pub fn shared_library(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            kind: DependencyKind::SharedLibrary,
        }
    }
}

/// Everything the jail builder needs to materialize an isolated root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JailSpec {
    /// Absolute path of the jail root on the host.
    pub root: PathBuf,
    /// Host paths copied into the jail, staged in declaration order.
    pub dependencies: Vec<Dependency>,
}

impl JailSpec {
    /// Creates a jail spec rooted at `root` with the default dependency
    /// trees (`/usr`, `/lib`, `/lib64`).
    #[must_use]
    pub fn with_default_dependencies(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dependencies: crate::constants::DEFAULT_DEPENDENCY_TREES
                .iter()
                .map(Dependency::tree)
                .collect(),
        }
    }

    /// Checks the spec's structural invariants.
    ///
    /// The root must be an absolute path. Dependency sources are checked
    /// for existence by the builder, not here, because they are a property
    /// of the host at build time rather than of the spec itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path is not absolute.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_absolute() {
            return Err(CachotError::Config {
                message: format!("jail root must be absolute: {}", self.root.display()),
            });
        }
        Ok(())
    }
}

/// CPU bandwidth quota for a cgroup, in microseconds per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CpuQuota {
    /// Unlimited CPU time.
    Max,
    /// At most this many microseconds of CPU time per period.
    Micros(u64),
}

impl fmt::Display for CpuQuota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Micros(us) => write!(f, "{us}"),
        }
    }
}

/// Resource limits applied to the launcher (and inherited by the child).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Cgroup subgroup name, unique per running container.
    pub cgroup_name: String,
    /// CPU bandwidth quota per period.
    pub cpu_quota: CpuQuota,
    /// CPU bandwidth period in microseconds.
    pub cpu_period_micros: u64,
    /// Hard memory limit in bytes, if any.
    pub memory_bytes: Option<u64>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            cgroup_name: crate::constants::DEFAULT_CGROUP_NAME.to_owned(),
            cpu_quota: CpuQuota::Micros(crate::constants::DEFAULT_CPU_QUOTA_MICROS),
            cpu_period_micros: crate::constants::DEFAULT_CPU_PERIOD_MICROS,
            memory_bytes: None,
        }
    }
}

impl ResourceLimits {
    /// Generates a cgroup name that is unique across invocations.
    #[must_use]
    pub fn unique_cgroup_name() -> String {
        format!(
            "{}-{}",
            crate::constants::DEFAULT_CGROUP_NAME,
            uuid::Uuid::new_v4()
        )
    }

    /// Checks the limits' invariants.
    ///
    /// A finite quota may exceed the period to claim more than one core,
    /// but never `period × available cores`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cgroup name is empty or contains a path
    /// separator, the period is zero, or a finite quota is zero or
    /// exceeds what the machine can supply.
    pub fn validate(&self) -> Result<()> {
        if self.cgroup_name.is_empty() || self.cgroup_name.contains('/') {
            return Err(CachotError::Config {
                message: format!("invalid cgroup name: {:?}", self.cgroup_name),
            });
        }
        if self.cpu_period_micros == 0 {
            return Err(CachotError::Config {
                message: "CPU period must be non-zero".into(),
            });
        }
        if let CpuQuota::Micros(quota) = self.cpu_quota {
            if quota == 0 {
                return Err(CachotError::Config {
                    message: "CPU quota must be non-zero (use \"max\" for unlimited)".into(),
                });
            }
            let cores = std::thread::available_parallelism().map_or(1, std::num::NonZero::get) as u64;
            let ceiling = self.cpu_period_micros.saturating_mul(cores);
            if quota > ceiling {
                return Err(CachotError::Config {
                    message: format!(
                        "CPU quota {quota}us exceeds {cores} core(s) x {}us period",
                        self.cpu_period_micros
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Why the launched process stopped running (or never ran).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationCause {
    /// The child exited normally.
    Exited,
    /// The child was killed by a signal.
    Signaled,
    /// The child could not be started at all.
    LaunchFailed,
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited => write!(f, "exited"),
            Self::Signaled => write!(f, "signaled"),
            Self::LaunchFailed => write!(f, "launch failed"),
        }
    }
}

/// Outcome of one container launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Exit code the launcher should terminate with.
    pub exit_code: i32,
    /// How the child (or the launch attempt) ended.
    pub cause: TerminationCause,
}

impl RunResult {
    /// Result for a child that exited normally with `code`.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self {
            exit_code: code,
            cause: TerminationCause::Exited,
        }
    }

    /// Result for a child killed by signal number `signo`.
    #[must_use]
    pub const fn signaled(signo: i32) -> Self {
        Self {
            exit_code: crate::constants::EXIT_SIGNAL_BASE + signo,
            cause: TerminationCause::Signaled,
        }
    }

    /// Result for a target that could not be started.
    #[must_use]
    pub const fn launch_failed() -> Self {
        Self {
            exit_code: crate::constants::EXIT_LAUNCH_FAILED,
            cause: TerminationCause::LaunchFailed,
        }
    }

    /// Whether the child ran and exited with code zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.cause, TerminationCause::Exited) && self.exit_code == 0
    }
}

/// Parses a human-readable memory size (`"128MiB"`, `"1GB"`, plain bytes).
#[must_use]
pub fn parse_memory_size(s: &str) -> Option<u64> {
    let s = s.trim();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GiB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("GB") {
        (n, 1_000_000_000)
    } else if let Some(n) = s.strip_suffix("MiB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1_000_000)
    } else if let Some(n) = s.strip_suffix("KiB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1000)
    } else {
        (s, 1)
    };
    num_str.trim().parse::<u64>().ok().map(|n| n * multiplier)
}
