//! Process spawning inside isolated namespaces.
//!
//! Namespace flags are passed to `clone(2)` as creation attributes; the
//! child execs the target command with stdin, stdout, and stderr
//! inherited untouched, and the launcher blocks until it terminates.

use cachot_common::error::{CachotError, Result};
use cachot_common::types::RunResult;
use cachot_core::namespace::NamespaceSet;

/// The command to execute inside the jail.
///
/// `argv[0]` is resolved against the already-switched root: either
/// directly when it contains a path separator, or through the jail's
/// `PATH` otherwise.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program and arguments, in exec order. Must be non-empty.
    pub argv: Vec<String>,
    /// Namespaces the child is created in.
    pub namespaces: NamespaceSet,
}

impl CommandSpec {
    /// Creates a spec with the default namespace set (PID isolation).
    #[must_use]
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            namespaces: NamespaceSet::default(),
        }
    }

    /// Replaces the namespace set.
    #[must_use]
    pub const fn with_namespaces(mut self, namespaces: NamespaceSet) -> Self {
        self.namespaces = namespaces;
        self
    }
}

/// Stack size handed to `clone(2)` for the child before it execs.
#[cfg(target_os = "linux")]
const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Spawns the target command and waits for it to terminate.
///
/// A program that cannot be resolved yields a
/// [`cachot_common::types::TerminationCause::LaunchFailed`] result with
/// the sentinel exit code, and no child is spawned. A spawned child's
/// normal exit or signal death is mapped onto the corresponding
/// termination cause; an exec failure inside the child surfaces as an
/// exit with the same sentinel code.
///
/// # Errors
///
/// Returns an error if `argv` is empty, or if the clone or wait
/// syscalls themselves fail.
#[cfg(target_os = "linux")]
pub fn launch(spec: &CommandSpec) -> Result<RunResult> {
    use std::ffi::CString;

    use nix::sys::wait::{WaitStatus, waitpid};

    let Some(program) = spec.argv.first() else {
        return Err(CachotError::Config {
            message: "command argv must not be empty".into(),
        });
    };

    let Some(resolved) = resolve_program(program) else {
        tracing::error!(program, "target executable not found in jail");
        return Ok(RunResult::launch_failed());
    };

    let program_c = path_to_cstring(&resolved)?;
    let argv_c = spec
        .argv
        .iter()
        .map(|arg| {
            CString::new(arg.as_str()).map_err(|_| CachotError::Config {
                message: format!("argument contains NUL byte: {arg:?}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut stack = vec![0u8; CHILD_STACK_SIZE];
    let child_main = Box::new(|| -> isize {
        // Runs in the child with fds 0/1/2 inherited from the invoker.
        let _ = nix::unistd::execvp(&program_c, &argv_c);
        // Only reached when exec itself failed.
        cachot_common::constants::EXIT_LAUNCH_FAILED as isize
    });

    // SAFETY: the child callback only calls execvp on pre-built argument
    // vectors and returns an exit code; it shares no mutable state with
    // the parent.
    let child = unsafe {
        nix::sched::clone(
            child_main,
            &mut stack,
            spec.namespaces.clone_flags(),
            Some(libc::SIGCHLD),
        )
    }
    .map_err(|e| CachotError::PermissionDenied {
        message: format!("clone failed: {e}"),
    })?;
    tracing::info!(pid = child.as_raw(), cmd = ?spec.argv, "container process spawned");

    loop {
        let status = waitpid(child, None).map_err(|e| CachotError::PermissionDenied {
            message: format!("waitpid failed: {e}"),
        })?;
        match status {
            WaitStatus::Exited(_, code) => {
                tracing::info!(code, "container process exited");
                return Ok(RunResult::exited(code));
            }
            WaitStatus::Signaled(_, signal, _) => {
                tracing::warn!(signal = %signal, "container process killed by signal");
                return Ok(RunResult::signaled(signal as i32));
            }
            // Stop/continue events are not terminal.
            _ => {}
        }
    }
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — namespaced process spawning requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn launch(_spec: &CommandSpec) -> Result<RunResult> {
    Err(CachotError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Resolves `argv[0]` to an executable path.
///
/// Paths containing a separator are checked directly; bare names go
/// through `PATH` lookup, which the root switch has already pointed at
/// the jail's binary directory.
#[cfg(target_os = "linux")]
fn resolve_program(name: &str) -> Option<std::path::PathBuf> {
    if name.contains('/') {
        let path = std::path::Path::new(name);
        path.is_file().then(|| path.to_path_buf())
    } else {
        which::which(name).ok()
    }
}

#[cfg(target_os = "linux")]
fn path_to_cstring(path: &std::path::Path) -> Result<std::ffi::CString> {
    use std::os::unix::ffi::OsStrExt;

    std::ffi::CString::new(path.as_os_str().as_bytes()).map_err(|_| CachotError::Config {
        message: format!("path contains NUL byte: {}", path.display()),
    })
}
