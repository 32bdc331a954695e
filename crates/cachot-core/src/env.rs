//! Explicit handle over process-global environment state.
//!
//! Working directory, filesystem root, and `PATH` are process-wide
//! mutable state. Pipeline stages mutate them only through the
//! [`ProcessEnv`] trait so that ordering can be asserted in tests with a
//! fake, while production code uses the real [`HostEnv`].

use std::path::Path;

use cachot_common::error::Result;

/// Mutations of process-global environment state, in the only order the
/// pipeline is allowed to perform them.
pub trait ProcessEnv {
    /// Changes the process working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory change fails.
    fn change_dir(&mut self, path: &Path) -> Result<()>;

    /// Changes the process filesystem root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root change fails.
    fn change_root(&mut self, path: &Path) -> Result<()>;

    /// Overwrites the `PATH` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable cannot be set.
    fn set_path_var(&mut self, value: &str) -> Result<()>;
}

/// The real process environment, backed by `chdir(2)`, `chroot(2)`, and
/// the process environment block.
#[derive(Debug, Default)]
pub struct HostEnv;

#[cfg(target_os = "linux")]
impl ProcessEnv for HostEnv {
    fn change_dir(&mut self, path: &Path) -> Result<()> {
        nix::unistd::chdir(path).map_err(|e| {
            cachot_common::error::CachotError::PermissionDenied {
                message: format!("chdir to {} failed: {e}", path.display()),
            }
        })?;
        tracing::debug!(path = %path.display(), "working directory changed");
        Ok(())
    }

    fn change_root(&mut self, path: &Path) -> Result<()> {
        nix::unistd::chroot(path).map_err(|e| {
            cachot_common::error::CachotError::PermissionDenied {
                message: format!("chroot to {} failed: {e}", path.display()),
            }
        })?;
        tracing::debug!(path = %path.display(), "filesystem root changed");
        Ok(())
    }

    fn set_path_var(&mut self, value: &str) -> Result<()> {
        // SAFETY: the launcher pipeline is single-threaded; nothing else
        // reads or writes the environment block during this call.
        unsafe { std::env::set_var("PATH", value) };
        tracing::debug!(value, "PATH overwritten");
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
impl ProcessEnv for HostEnv {
    /// Stub for non-Linux platforms.
    fn change_dir(&mut self, _path: &Path) -> Result<()> {
        Err(cachot_common::error::CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }

    /// Stub for non-Linux platforms.
    fn change_root(&mut self, _path: &Path) -> Result<()> {
        Err(cachot_common::error::CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }

    /// Stub for non-Linux platforms.
    fn set_path_var(&mut self, _value: &str) -> Result<()> {
        Err(cachot_common::error::CachotError::Config {
            message: "Linux required for native container operations".into(),
        })
    }
}
