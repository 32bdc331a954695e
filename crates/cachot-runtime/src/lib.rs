//! # cachot-runtime
//!
//! The launch pipeline of the Cachot container launcher.
//!
//! [`pipeline`] encodes the setup sequence (jail build, resource
//! limiting, root switch) as a typed state machine whose transitions
//! each consume the previous stage's witness, so skipping or reordering
//! an isolation step is a compile error. [`process`] spawns the target
//! command inside the configured namespaces and maps its termination
//! into a [`cachot_common::types::RunResult`].

pub mod pipeline;
pub mod process;
