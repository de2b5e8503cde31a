//! Native build-system driving: configure, then compile.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::command::Invocation;
use crate::core::types::{BuildConfig, TargetArch};
use crate::io::process::CommandRunner;

/// Parameters for one project's configure-and-build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Build-output directory; created if absent. It is also the working
    /// directory for both build-system invocations, which resolve `..` as
    /// the source tree, so the cwd must be exact.
    pub build_dir: PathBuf,
    /// Helper configuration file injected at configure time (`-C`),
    /// build-dir-relative.
    pub helper_config: Option<String>,
    /// Extra cache defines passed verbatim at configure time.
    pub defines: Vec<String>,
    /// Restrict the compile step to a single target.
    pub target: Option<String>,
    pub config: BuildConfig,
    /// Architecture selector, appended on Windows hosts. `None` for projects
    /// whose configure step carries no selector.
    pub arch: Option<TargetArch>,
    /// Whether the host is Windows; injected so both branches are testable
    /// on one host.
    pub windows_host: bool,
}

/// Configure and compile one project in its build directory.
pub fn configure_and_build<R: CommandRunner>(runner: &R, opts: &BuildOptions) -> Result<()> {
    fs::create_dir_all(&opts.build_dir)
        .with_context(|| format!("create build dir {}", opts.build_dir.display()))?;

    let mut configure = vec!["cmake".to_string()];
    if let Some(helper) = &opts.helper_config {
        configure.push("-C".to_string());
        configure.push(helper.clone());
    }
    configure.push(format!("-DCMAKE_BUILD_TYPE={}", opts.config.build_type()));
    configure.extend(opts.defines.iter().cloned());
    configure.push("..".to_string());
    if opts.windows_host && let Some(arch) = opts.arch {
        configure.push("-A".to_string());
        configure.push(arch.as_str().to_string());
    }
    runner.run(&Invocation::new(configure, &opts.build_dir))?;

    let mut build = vec![
        "cmake".to_string(),
        "--build".to_string(),
        ".".to_string(),
    ];
    if let Some(target) = &opts.target {
        build.push("--target".to_string());
        build.push(target.clone());
    }
    build.push("--config".to_string());
    build.push(opts.config.as_str().to_string());
    runner.run(&Invocation::new(build, &opts.build_dir))
}
