//! Source acquisition for external dependency repositories.
//!
//! Presence is the only check: an existing directory is never re-cloned or
//! inspected for staleness, so a clone that failed partway must be removed
//! by hand before the next run will retry it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::command::Invocation;
use crate::core::types::{BuildConfig, TargetArch};
use crate::io::config::DepSource;
use crate::io::process::CommandRunner;

/// One external repository the pipeline depends on.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub name: String,
    pub url: String,
    /// Tag checked out after cloning, when a release is pinned.
    pub tag: Option<String>,
    /// Local checkout path under the external-dependencies directory.
    pub local: PathBuf,
}

impl Dependency {
    pub fn new(name: impl Into<String>, source: &DepSource, local: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            url: source.url.clone(),
            tag: source.tag.clone(),
            local: local.into(),
        }
    }
}

/// Ensure the dependency's source tree exists locally.
///
/// Clones (and checks out the pinned tag) only when the local path is
/// absent. Returns `true` when a clone was performed.
pub fn ensure_present<R: CommandRunner>(runner: &R, dep: &Dependency) -> Result<bool> {
    if dep.local.exists() {
        debug!(name = %dep.name, path = %dep.local.display(), "already present, skipping clone");
        return Ok(false);
    }
    let parent = dep
        .local
        .parent()
        .with_context(|| format!("{} has no parent directory", dep.local.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    println!("Clone {} source code", dep.name);
    let target = dep.local.display().to_string();
    runner.run(&Invocation::new(
        ["git", "clone", dep.url.as_str(), target.as_str()],
        parent,
    ))?;

    if let Some(tag) = &dep.tag {
        println!("Check out pinned {} release", dep.name);
        let tag_ref = format!("tags/{tag}");
        runner.run(&Invocation::new(
            ["git", "checkout", tag_ref.as_str()],
            &dep.local,
        ))?;
    }
    Ok(true)
}

/// Run a repository's own dependency-resolution helper.
///
/// The helper resolves that tree's transitive dependencies into
/// `external_dir_name` and may perform clones of its own; this is delegated,
/// not re-implemented. `pin` forwards the build configuration and
/// architecture for repositories whose helper is parameterized by them.
pub fn update_deps<R: CommandRunner>(
    runner: &R,
    project_dir: &Path,
    external_dir_name: &str,
    pin: Option<(BuildConfig, TargetArch)>,
) -> Result<()> {
    let mut tokens = vec![
        "python3".to_string(),
        "scripts/update_deps.py".to_string(),
        "--dir".to_string(),
        external_dir_name.to_string(),
    ];
    if let Some((config, arch)) = pin {
        tokens.push("--config".to_string());
        tokens.push(config.as_str().to_string());
        tokens.push("--arch".to_string());
        tokens.push(arch.as_str().to_string());
    }
    runner.run(&Invocation::new(tokens, project_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRunner;

    fn dep(local: PathBuf, tag: Option<&str>) -> Dependency {
        Dependency {
            name: "test framework".to_string(),
            url: "https://github.com/google/googletest.git".to_string(),
            tag: tag.map(str::to_string),
            local,
        }
    }

    #[test]
    fn clones_and_checks_out_pin_when_absent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::new();
        let dep = dep(temp.path().join("external/googletest"), Some("release-1.8.1"));

        let cloned = ensure_present(&runner, &dep).expect("ensure");
        assert!(cloned);

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("git clone https://github.com/google/googletest.git"));
        assert_eq!(lines[1], "git checkout tags/release-1.8.1");
        assert!(dep.local.exists());
    }

    #[test]
    fn present_checkout_is_never_recloned() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::new();
        let dep = dep(temp.path().join("external/googletest"), Some("release-1.8.1"));

        ensure_present(&runner, &dep).expect("first ensure");
        let after_first = runner.command_lines().len();

        let cloned = ensure_present(&runner, &dep).expect("second ensure");
        assert!(!cloned);
        assert_eq!(runner.command_lines().len(), after_first);
    }

    #[test]
    fn untagged_dependency_skips_checkout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::new();
        let dep = dep(temp.path().join("external/loader"), None);

        ensure_present(&runner, &dep).expect("ensure");
        let lines = runner.command_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("git clone"));
    }

    #[test]
    fn update_deps_forwards_the_pin() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::new();

        update_deps(
            &runner,
            temp.path(),
            "external",
            Some((BuildConfig::Debug, TargetArch::X64)),
        )
        .expect("update deps");

        let calls = runner.calls();
        assert_eq!(
            calls[0].command_line(),
            "python3 scripts/update_deps.py --dir external --config debug --arch x64"
        );
        assert_eq!(calls[0].cwd, temp.path());
    }

    #[test]
    fn update_deps_without_pin_omits_the_flags() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::new();

        update_deps(&runner, temp.path(), "external", None).expect("update deps");
        assert_eq!(
            runner.command_lines()[0],
            "python3 scripts/update_deps.py --dir external"
        );
    }
}
