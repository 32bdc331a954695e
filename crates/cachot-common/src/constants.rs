//! System-wide constants and default paths.

/// Cgroups v2 unified hierarchy mount point.
pub const CGROUP_V2_PATH: &str = "/sys/fs/cgroup";

/// Default jail root directory on the host.
pub const DEFAULT_JAIL_ROOT: &str = "/tmp/cachot";

/// Directory inside the jail that receives single-binary dependencies,
/// relative to the jail root.
pub const JAIL_BIN_DIR: &str = "usr/bin";

/// Directory inside the jail for 32-bit / generic shared libraries.
pub const JAIL_LIB_DIR: &str = "lib";

/// Directory inside the jail for 64-bit shared libraries.
pub const JAIL_LIB64_DIR: &str = "lib64";

/// Value written to `PATH` once the root switch has completed, so that
/// executable lookup only resolves inside the jail.
pub const JAIL_PATH: &str = "/usr/bin";

/// Host directory trees copied into the jail by default.
pub const DEFAULT_DEPENDENCY_TREES: [&str; 3] = ["/usr", "/lib", "/lib64"];

/// Base name for per-invocation cgroups.
pub const DEFAULT_CGROUP_NAME: &str = "cachot";

/// Default CPU quota in microseconds per period (half of one core).
pub const DEFAULT_CPU_QUOTA_MICROS: u64 = 50_000;

/// Default CPU bandwidth period in microseconds.
pub const DEFAULT_CPU_PERIOD_MICROS: u64 = 100_000;

/// Exit code reported when the target executable could not be started at
/// all. Matches the shell convention for "command not found"; a child is
/// free to exit with the same code, so the two cases are distinguishable
/// only by documentation.
pub const EXIT_LAUNCH_FAILED: i32 = 127;

/// Base added to a signal number to form the launcher's exit code when the
/// child was killed by a signal.
pub const EXIT_SIGNAL_BASE: i32 = 128;

/// Application name used in CLI output and cgroup paths.
pub const APP_NAME: &str = "cachot";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "cachot";
