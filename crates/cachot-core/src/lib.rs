//! # cachot-core
//!
//! Low-level Linux isolation primitives for the Cachot launcher.
//!
//! This crate provides safe abstractions over:
//! - **Filesystem jails**: building a minimal root directory and switching
//!   the process root into it.
//! - **Cgroups v2**: CPU bandwidth and memory limiting via the unified
//!   hierarchy.
//! - **Namespaces**: PID, Mount, UTS, and IPC isolation expressed as
//!   child-creation flags.
//! - **Process environment**: an explicit context object over the
//!   process-global working directory, root, and `PATH`.
//!
//! All unsafe system calls are encapsulated in safe wrappers with
//! proper error handling and `// SAFETY:` documentation.

pub mod cgroup;
pub mod env;
pub mod jail;
pub mod namespace;
