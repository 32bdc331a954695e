//! End-to-end tests for the Cachot launch pipeline.
//!
//! These tests verify the pipeline stage by stage:
//! 1. Jail building (real filesystem, scratch directories)
//! 2. Launch and termination mapping (real processes, no namespaces)
//! 3. Cgroup lifecycle (real cgroup2 hierarchy, root only)
//! 4. Full isolation (root only, run manually with `--ignored`)

#![allow(clippy::expect_used, clippy::unwrap_used)]

use cachot_common::types::{
    CpuQuota, Dependency, JailSpec, ResourceLimits, RunResult, TerminationCause,
};
use cachot_core::namespace::NamespaceSet;
use cachot_runtime::pipeline;
use cachot_runtime::process::{self, CommandSpec};

// ── Jail building ────────────────────────────────────────────────────

#[test]
fn pipeline_build_stage_materializes_jail() {
    let host = tempfile::tempdir().expect("tempdir");
    let tree = host.path().join("usr");
    std::fs::create_dir_all(tree.join("bin")).expect("mkdir");
    std::fs::write(tree.join("bin/sh"), "shell").expect("write");

    let root = host.path().join("jail");
    let spec = JailSpec {
        root: root.clone(),
        dependencies: vec![Dependency::tree(&tree)],
    };

    let built = pipeline::build_jail(&spec).expect("build stage");
    assert_eq!(built.root(), root);
    assert!(root.join("usr/bin/sh").exists());
}

#[test]
fn pipeline_build_stage_is_repeatable() {
    let host = tempfile::tempdir().expect("tempdir");
    let tree = host.path().join("lib");
    std::fs::create_dir_all(&tree).expect("mkdir");
    std::fs::write(tree.join("libx.so"), "elf").expect("write");

    let root = host.path().join("jail");
    let spec = JailSpec {
        root: root.clone(),
        dependencies: vec![Dependency::tree(&tree)],
    };

    let _ = pipeline::build_jail(&spec).expect("first build");
    let _ = pipeline::build_jail(&spec).expect("rebuild against existing jail");
    assert!(root.join("lib/libx.so").exists());
}

#[test]
fn pipeline_build_stage_rejects_missing_dependency() {
    let host = tempfile::tempdir().expect("tempdir");
    let spec = JailSpec {
        root: host.path().join("jail"),
        dependencies: vec![Dependency::binary(host.path().join("ghost"))],
    };
    assert!(pipeline::build_jail(&spec).is_err());
}

// ── Launch and termination mapping ───────────────────────────────────
//
// These run without namespaces so they need no privileges; the
// namespace flags themselves are covered by unit tests and the
// root-gated scenario below.

#[cfg(target_os = "linux")]
fn launch_plain(argv: &[&str]) -> RunResult {
    let spec = CommandSpec::new(argv.iter().map(ToString::to_string).collect())
        .with_namespaces(NamespaceSet::none());
    process::launch(&spec).expect("launch")
}

#[cfg(target_os = "linux")]
#[test]
fn launch_exits_zero_for_true() {
    let result = launch_plain(&["true"]);
    assert_eq!(result.cause, TerminationCause::Exited);
    assert_eq!(result.exit_code, 0);
    assert!(result.success());
}

#[cfg(target_os = "linux")]
#[test]
fn launch_propagates_child_exit_code() {
    let result = launch_plain(&["sh", "-c", "exit 3"]);
    assert_eq!(result.cause, TerminationCause::Exited);
    assert_eq!(result.exit_code, 3);
}

#[cfg(target_os = "linux")]
#[test]
fn launch_missing_binary_is_launch_failed() {
    let result = launch_plain(&["/bin/does-not-exist"]);
    assert_eq!(result.cause, TerminationCause::LaunchFailed);
    assert_eq!(result.exit_code, 127);
}

#[cfg(target_os = "linux")]
#[test]
fn launch_signal_death_is_signaled() {
    let result = launch_plain(&["sh", "-c", "kill -TERM $$"]);
    assert_eq!(result.cause, TerminationCause::Signaled);
    assert_eq!(result.exit_code, 128 + 15);
}

// ── Cgroup lifecycle (root only) ─────────────────────────────────────

#[cfg(target_os = "linux")]
#[test]
fn cgroup_limits_land_in_control_files() {
    if !nix::unistd::geteuid().is_root() {
        eprintln!("skipping: requires root");
        return;
    }

    let name = format!("cachot-test-{}", std::process::id());
    let limits = ResourceLimits {
        cgroup_name: name.clone(),
        cpu_quota: CpuQuota::Micros(50_000),
        cpu_period_micros: 100_000,
        memory_bytes: Some(128 * 1024 * 1024),
    };

    let cgroup = cachot_core::cgroup::CgroupManager::create(&name).expect("create cgroup");
    cgroup.apply_limits(&limits).expect("apply limits");

    let cpu_max =
        std::fs::read_to_string(cgroup.path().join("cpu.max")).expect("read cpu.max");
    assert_eq!(cpu_max.trim(), "50000 100000");
    let memory_max =
        std::fs::read_to_string(cgroup.path().join("memory.max")).expect("read memory.max");
    assert_eq!(memory_max.trim(), "134217728");

    // The test process never attached itself, so the group is removable.
    cgroup.destroy().expect("destroy cgroup");
    assert!(!cgroup.path().exists());
}

// ── Full isolation (root only, manual) ───────────────────────────────
//
// Switches the test process root, so it must run alone:
//   sudo cargo test -p cachot-runtime -- --ignored e2e

#[cfg(target_os = "linux")]
#[test]
#[ignore = "requires root and switches the test process root"]
fn e2e_shell_echo_inside_jail() {
    use cachot_common::config::LauncherConfig;

    let config = LauncherConfig {
        jail_root: std::path::PathBuf::from("/tmp/cachot-e2e"),
        limits: ResourceLimits {
            cgroup_name: format!("cachot-e2e-{}", std::process::id()),
            ..ResourceLimits::default()
        },
        ..LauncherConfig::default()
    };

    let result = pipeline::run(
        &config,
        vec!["/bin/sh".into(), "-c".into(), "echo hi".into()],
    )
    .expect("pipeline");
    assert_eq!(result.cause, TerminationCause::Exited);
    assert_eq!(result.exit_code, 0);
}
