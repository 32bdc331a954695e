//! Global configuration model for the Cachot launcher.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CachotError, Result};
use crate::types::{Dependency, ResourceLimits};

/// Root configuration for one launcher invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Directory on the host where the jail is built.
    pub jail_root: PathBuf,
    /// Host paths copied into the jail.
    pub dependencies: Vec<Dependency>,
    /// Resource limits applied before the root switch.
    pub limits: ResourceLimits,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            jail_root: PathBuf::from(crate::constants::DEFAULT_JAIL_ROOT),
            dependencies: crate::constants::DEFAULT_DEPENDENCY_TREES
                .iter()
                .map(Dependency::tree)
                .collect(),
            limits: ResourceLimits::default(),
        }
    }
}

impl LauncherConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CachotError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
