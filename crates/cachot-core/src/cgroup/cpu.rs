//! CPU bandwidth control via cgroups v2.
//!
//! Manages the `cpu.max` control file.

use std::path::Path;

use cachot_common::error::{CachotError, Result};
use cachot_common::types::CpuQuota;

/// Sets the CPU bandwidth limit for a cgroup.
///
/// Writes `"<quota> <period>"` to `cpu.max`, where `quota` is the
/// maximum CPU time in microseconds allowed per `period` microseconds of
/// wall time, or the literal `max` for unlimited.
///
/// # Errors
///
/// Returns an error if writing to `cpu.max` fails.
#[cfg(target_os = "linux")]
pub fn set_cpu_max(cgroup_path: &Path, quota: CpuQuota, period_us: u64) -> Result<()> {
    let file = cgroup_path.join("cpu.max");
    let value = format!("{quota} {period_us}");
    std::fs::write(&file, value).map_err(|e| CachotError::Io {
        path: file,
        source: e,
    })?;
    tracing::debug!(%quota, period_us, "CPU max quota set");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — cgroup CPU control requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn set_cpu_max(_cgroup_path: &Path, _quota: CpuQuota, _period_us: u64) -> Result<()> {
    Err(CachotError::Config {
        message: "Linux required for native container operations".into(),
    })
}
