//! Native recursive copy for jail population.
//!
//! Operates on filesystem APIs directly and returns structured errors
//! instead of shelling out to an external copy utility. Symbolic links
//! are re-created rather than followed, so library chains like
//! `libc.so.6 -> libc-2.39.so` survive staging intact.

use std::path::Path;

use cachot_common::error::{CachotError, Result};

/// Recursively copies the directory tree at `src` into `dst`.
///
/// `dst` is created if absent. Existing files are overwritten and
/// existing symlinks replaced, which makes re-staging over a previously
/// built jail idempotent.
///
/// # Errors
///
/// Returns an error if any directory, file, or link operation fails.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst).map_err(|e| CachotError::Io {
        path: dst.to_path_buf(),
        source: e,
    })?;

    let entries = std::fs::read_dir(src).map_err(|e| CachotError::Io {
        path: src.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| CachotError::Io {
            path: src.to_path_buf(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| CachotError::Io {
            path: entry.path(),
            source: e,
        })?;
        let target = dst.join(entry.file_name());
        if file_type.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            copy_entry(&entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copies a single filesystem entry (regular file or symlink) to `dst`.
///
/// # Errors
///
/// Returns an error if the source cannot be inspected or the copy fails.
pub fn copy_entry(src: &Path, dst: &Path) -> Result<()> {
    let metadata = std::fs::symlink_metadata(src).map_err(|e| CachotError::Io {
        path: src.to_path_buf(),
        source: e,
    })?;
    if metadata.file_type().is_symlink() {
        replace_symlink(src, dst)
    } else {
        // fs::copy preserves the permission bits of the source.
        let _ = std::fs::copy(src, dst).map_err(|e| CachotError::Io {
            path: src.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

#[cfg(unix)]
fn replace_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link_target = std::fs::read_link(src).map_err(|e| CachotError::Io {
        path: src.to_path_buf(),
        source: e,
    })?;
    match std::fs::remove_file(dst) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(CachotError::Io {
                path: dst.to_path_buf(),
                source: e,
            });
        }
    }
    std::os::unix::fs::symlink(&link_target, dst).map_err(|e| CachotError::Io {
        path: dst.to_path_buf(),
        source: e,
    })
}

#[cfg(not(unix))]
fn replace_symlink(_src: &Path, _dst: &Path) -> Result<()> {
    Err(CachotError::Config {
        message: "symbolic links require a Unix host".into(),
    })
}
