//! Filesystem jail construction.
//!
//! Materializes an isolated root directory containing only the binaries,
//! libraries, and directory trees the contained process needs. Copying is
//! done natively through filesystem APIs; no external copy utility is
//! shelled out to.

pub mod copy;
pub mod enter;

use std::path::Path;

use cachot_common::constants::{JAIL_BIN_DIR, JAIL_LIB64_DIR, JAIL_LIB_DIR};
use cachot_common::error::{CachotError, Result};
use cachot_common::types::{Dependency, DependencyKind, JailSpec};

/// Builds the jail described by `spec`.
///
/// A pre-existing jail root is tolerated and logged: re-running against a
/// previously built jail is a supported fast path, and staging overwrites
/// files non-destructively. Every other failure is fatal: a partially
/// populated jail is not safe to run against.
///
/// # Errors
///
/// Returns an error if the spec is invalid, a dependency source is
/// missing on the host, or any copy fails.
pub fn build_jail(spec: &JailSpec) -> Result<()> {
    spec.validate()?;
    for dep in &spec.dependencies {
        if !dep.source.exists() {
            return Err(CachotError::NotFound {
                kind: "dependency source",
                id: dep.source.display().to_string(),
            });
        }
    }

    if spec.root.exists() {
        tracing::warn!(root = %spec.root.display(), "jail root already exists, reusing");
    } else {
        std::fs::create_dir_all(&spec.root).map_err(|e| CachotError::Io {
            path: spec.root.clone(),
            source: e,
        })?;
    }

    for dep in &spec.dependencies {
        stage_dependency(&spec.root, dep)?;
    }

    tracing::info!(
        root = %spec.root.display(),
        dependencies = spec.dependencies.len(),
        "jail built"
    );
    Ok(())
}

/// Copies one dependency into its place inside the jail.
fn stage_dependency(root: &Path, dep: &Dependency) -> Result<()> {
    tracing::debug!(source = %dep.source.display(), kind = ?dep.kind, "staging dependency");
    match dep.kind {
        DependencyKind::Tree => {
            let name = basename(&dep.source)?;
            copy::copy_tree(&dep.source, &root.join(name))
        }
        DependencyKind::Binary => copy_into_dir(&dep.source, &root.join(JAIL_BIN_DIR)),
        DependencyKind::SharedLibrary => {
            let lib_dir = if is_lib64_path(&dep.source) {
                JAIL_LIB64_DIR
            } else {
                JAIL_LIB_DIR
            };
            copy_into_dir(&dep.source, &root.join(lib_dir))
        }
    }
}

/// Copies a single file (or symlink) into `dir`, creating `dir` first.
fn copy_into_dir(source: &Path, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| CachotError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let name = basename(source)?;
    copy::copy_entry(source, &dir.join(name))
}

fn basename(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| CachotError::Config {
        message: format!("dependency path has no file name: {}", path.display()),
    })
}

/// Whether a source path lives under a 64-bit library location.
fn is_lib64_path(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == std::ffi::OsStr::new(JAIL_LIB64_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, content).expect("write");
    }

    #[test]
    fn build_places_binary_under_usr_bin() {
        let host = tempfile::tempdir().expect("tempdir");
        let tool = host.path().join("tool");
        write_file(&tool, "#!/bin/sh\n");

        let root = host.path().join("jail");
        let spec = JailSpec {
            root: root.clone(),
            dependencies: vec![Dependency::binary(&tool)],
        };
        build_jail(&spec).expect("build");
        assert!(root.join("usr/bin/tool").exists());
    }

    #[test]
    fn build_places_library_by_bitness() {
        let host = tempfile::tempdir().expect("tempdir");
        let narrow = host.path().join("lib/libc.so.6");
        let wide = host.path().join("lib64/ld-linux.so.2");
        write_file(&narrow, "elf32");
        write_file(&wide, "elf64");

        let root = host.path().join("jail");
        let spec = JailSpec {
            root: root.clone(),
            dependencies: vec![
                Dependency::shared_library(&narrow),
                Dependency::shared_library(&wide),
            ],
        };
        build_jail(&spec).expect("build");
        assert!(root.join("lib/libc.so.6").exists());
        assert!(root.join("lib64/ld-linux.so.2").exists());
    }

    #[test]
    fn build_copies_whole_tree_under_basename() {
        let host = tempfile::tempdir().expect("tempdir");
        let tree = host.path().join("usr");
        write_file(&tree.join("bin/sh"), "shell");
        write_file(&tree.join("share/doc/readme"), "docs");

        let root = host.path().join("jail");
        let spec = JailSpec {
            root: root.clone(),
            dependencies: vec![Dependency::tree(&tree)],
        };
        build_jail(&spec).expect("build");
        assert!(root.join("usr/bin/sh").exists());
        assert!(root.join("usr/share/doc/readme").exists());
    }

    #[test]
    fn build_missing_source_fails_before_copying() {
        let host = tempfile::tempdir().expect("tempdir");
        let root = host.path().join("jail");
        let spec = JailSpec {
            root: root.clone(),
            dependencies: vec![Dependency::tree(host.path().join("does-not-exist"))],
        };
        let result = build_jail(&spec);
        assert!(matches!(result, Err(CachotError::NotFound { .. })));
        assert!(!root.exists(), "nothing should be created for an invalid spec");
    }

    #[test]
    fn rebuild_over_existing_jail_succeeds() {
        let host = tempfile::tempdir().expect("tempdir");
        let tool = host.path().join("tool");
        write_file(&tool, "v1");

        let root = host.path().join("jail");
        let spec = JailSpec {
            root: root.clone(),
            dependencies: vec![Dependency::binary(&tool)],
        };
        build_jail(&spec).expect("first build");

        write_file(&tool, "v2");
        build_jail(&spec).expect("rebuild");

        let staged = std::fs::read_to_string(root.join("usr/bin/tool")).expect("read");
        assert_eq!(staged, "v2", "rebuild should overwrite, not duplicate");
    }

    #[test]
    fn relative_root_is_rejected() {
        let spec = JailSpec {
            root: PathBuf::from("relative"),
            dependencies: vec![],
        };
        assert!(matches!(build_jail(&spec), Err(CachotError::Config { .. })));
    }

    #[test]
    fn lib64_detection_is_component_based() {
        assert!(is_lib64_path(Path::new("/usr/lib64/libm.so")));
        assert!(is_lib64_path(Path::new("/lib64/ld.so")));
        assert!(!is_lib64_path(Path::new("/usr/lib/libm.so")));
        assert!(!is_lib64_path(Path::new("/opt/lib64extra/libm.so")));
    }
}
