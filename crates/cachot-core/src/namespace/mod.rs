//! Linux namespace selection for container isolation.
//!
//! Namespaces are expressed as *child-creation attributes*: the set below
//! converts to `clone(2)` flags passed at spawn time, so only the spawned
//! child enters the new namespaces, never the calling process. The
//! kernel does not support re-parenting a running process's PID
//! namespace, which makes this ordering structural, not stylistic.

/// Which namespaces the child process is created in.
///
/// Modeled as a set rather than a boolean so adding an isolation
/// dimension later is a field addition. Network and user namespaces are
/// deliberately absent.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceSet {
    /// Isolate the PID namespace; the child sees itself as PID 1.
    pub pid: bool,
    /// Isolate the mount namespace.
    pub mount: bool,
    /// Isolate the UTS (hostname) namespace.
    pub uts: bool,
    /// Isolate the IPC namespace.
    pub ipc: bool,
}

impl Default for NamespaceSet {
    /// PID isolation only, the minimum the launcher guarantees.
    fn default() -> Self {
        Self {
            pid: true,
            mount: false,
            uts: false,
            ipc: false,
        }
    }
}

impl NamespaceSet {
    /// The empty set: the child shares every namespace with the host.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            pid: false,
            mount: false,
            uts: false,
            ipc: false,
        }
    }

    /// Whether no namespace is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.pid || self.mount || self.uts || self.ipc)
    }

    /// Converts the set into `clone(2)` creation flags.
    #[cfg(target_os = "linux")]
    #[must_use]
    pub fn clone_flags(&self) -> nix::sched::CloneFlags {
        use nix::sched::CloneFlags;

        let mut flags = CloneFlags::empty();
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        if self.mount {
            flags |= CloneFlags::CLONE_NEWNS;
        }
        if self.uts {
            flags |= CloneFlags::CLONE_NEWUTS;
        }
        if self.ipc {
            flags |= CloneFlags::CLONE_NEWIPC;
        }
        flags
    }
}
