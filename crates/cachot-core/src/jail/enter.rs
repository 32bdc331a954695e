//! Root switch: confining the process's filesystem view to the jail.
//!
//! Ordering here is load-bearing. The working directory must change
//! before the root does, and `PATH` must point inside the jail before
//! any executable lookup happens. Once the switch succeeds, no host-side
//! absolute path may be referenced again in this process.

use std::path::Path;

use cachot_common::constants::JAIL_PATH;
use cachot_common::error::Result;

use crate::env::ProcessEnv;

/// Switches the process into the jail at `root`.
///
/// Performs, in order: working-directory change, root change, `PATH`
/// reset to the jail's binary directory. The first failure aborts the
/// sequence; a process must never run partially isolated.
///
/// # Errors
///
/// Returns an error if any of the three environment mutations fails.
pub fn enter_jail(env: &mut dyn ProcessEnv, root: &Path) -> Result<()> {
    tracing::info!(root = %root.display(), "entering jail");
    env.change_dir(root)?;
    env.change_root(root)?;
    env.set_path_var(JAIL_PATH)?;
    Ok(())
}
