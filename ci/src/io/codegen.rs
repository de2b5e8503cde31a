//! Source-generator invocations: consistency checking and artifact emission.
//!
//! The generator consumes the machine-readable API registry and emits
//! boilerplate headers and sources. Verification re-runs it against the
//! checked-in output; emission writes driver sources that the driver build
//! then compiles.

use std::path::Path;

use anyhow::Result;

use crate::core::command::Invocation;
use crate::io::process::CommandRunner;

/// Registry file consumed by `-registry` generator invocations.
const REGISTRY_FILE: &str = "api.xml";

/// Re-run the generator in verify mode against `registry_dir`.
///
/// Succeeds silently when the checked-in generated sources match what the
/// generator would produce; a non-zero exit means they are stale relative to
/// the registry. No side effects beyond the check.
pub fn verify_generated<R: CommandRunner>(
    runner: &R,
    root: &Path,
    registry_dir: &Path,
) -> Result<()> {
    println!("Check generated source code consistency");
    let registry = registry_dir.display().to_string();
    runner.run(&Invocation::new(
        [
            "python3",
            "scripts/generate_source.py",
            "--verify",
            registry.as_str(),
        ],
        root,
    ))
}

/// Emit one generated artifact into `out_dir`.
///
/// Always regenerates; the build that follows compiles whatever was written.
pub fn generate<R: CommandRunner>(
    runner: &R,
    script: &Path,
    registry_dir: &Path,
    output_name: &str,
    out_dir: &Path,
) -> Result<()> {
    let script = script.display().to_string();
    let registry = registry_dir.join(REGISTRY_FILE).display().to_string();
    runner.run(&Invocation::new(
        [
            "python3",
            script.as_str(),
            "-registry",
            registry.as_str(),
            output_name,
        ],
        out_dir,
    ))
}
