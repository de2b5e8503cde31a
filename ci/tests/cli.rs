//! CLI argument surface tests for the ci binary.
//!
//! Spawns the binary only where clap rejects the input before any stage
//! runs, so no external tool is ever invoked.

use std::process::Command;

use ci::exit_codes;

#[test]
fn help_exits_ok_without_running_any_stage() {
    let out = Command::new(env!("CARGO_BIN_EXE_ci"))
        .arg("--help")
        .output()
        .expect("run ci");
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--config"), "{stdout}");
    assert!(stdout.contains("--arch"), "{stdout}");
}

#[test]
fn rejects_unknown_config_value() {
    let out = Command::new(env!("CARGO_BIN_EXE_ci"))
        .args(["--config", "fast"])
        .output()
        .expect("run ci");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("release"), "{stderr}");
    assert!(stderr.contains("debug"), "{stderr}");
}

#[test]
fn rejects_unknown_arch_value() {
    let out = Command::new(env!("CARGO_BIN_EXE_ci"))
        .args(["--arch", "arm64"])
        .output()
        .expect("run ci");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("x64"), "{stderr}");
    assert!(stderr.contains("Win32"), "{stderr}");
}
