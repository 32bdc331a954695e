//! Memory resource control via cgroups v2.
//!
//! Manages the `memory.max` control file.

use std::path::Path;

use cachot_common::error::Result;

/// Sets the hard memory limit for a cgroup.
///
/// # Errors
///
/// Returns an error if writing to `memory.max` fails.
#[cfg(target_os = "linux")]
pub fn set_memory_max(cgroup_path: &Path, bytes: u64) -> Result<()> {
    let file = cgroup_path.join("memory.max");
    std::fs::write(&file, bytes.to_string()).map_err(|e| {
        cachot_common::error::CachotError::Io {
            path: file,
            source: e,
        }
    })?;
    tracing::debug!(bytes, "memory max limit set");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — cgroup memory control requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn set_memory_max(_cgroup_path: &Path, _bytes: u64) -> Result<()> {
    Err(cachot_common::error::CachotError::Config {
        message: "Linux required for native container operations".into(),
    })
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn writes_byte_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        set_memory_max(dir.path(), 128 * 1024 * 1024).expect("set");
        let content = std::fs::read_to_string(dir.path().join("memory.max")).expect("read");
        assert_eq!(content, "134217728");
    }
}
