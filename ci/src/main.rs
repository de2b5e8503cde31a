//! CI entry point: full build-and-test pipeline for the layer stack.
//!
//! Acquires the loader, mock driver, and test-framework sources, builds the
//! validation layers and their collaborators in dependency order, then runs
//! the layer validation tests against the mock driver.

use std::env;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use ci::core::paths::Paths;
use ci::core::types::{BuildConfig, TargetArch};
use ci::io::config::load_config;
use ci::io::process::{ShellRunner, exit_code_for};
use ci::logging;
use ci::pipeline::Pipeline;

#[derive(Parser)]
#[command(
    name = "ci",
    version,
    about = "Build and test the layer validation stack"
)]
struct Cli {
    /// Build target configuration.
    #[arg(short, long, value_enum, default_value_t = BuildConfig::Release)]
    config: BuildConfig,

    /// Target architecture (consulted on Windows hosts only).
    #[arg(short, long, value_enum, default_value_t = TargetArch::X64)]
    arch: TargetArch,

    /// Verify checked-in generated sources against the registry first.
    #[arg(long)]
    check_codegen: bool,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        process::exit(exit_code_for(&err));
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = env::current_dir().context("determine project root")?;
    let sources = load_config(&root.join("ci.toml"))?;
    let paths = Paths::new(root, &sources.external_dir, &sources.build_dir);
    let pipeline = Pipeline::new(paths, sources, cli.config, cli.arch, ShellRunner);
    if cli.check_codegen {
        pipeline.check_codegen()?;
    }
    pipeline.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["ci"]);
        assert_eq!(cli.config, BuildConfig::Release);
        assert_eq!(cli.arch, TargetArch::X64);
        assert!(!cli.check_codegen);
    }

    #[test]
    fn parse_debug_win32() {
        let cli = Cli::parse_from(["ci", "--config", "debug", "--arch", "Win32"]);
        assert_eq!(cli.config, BuildConfig::Debug);
        assert_eq!(cli.arch, TargetArch::Win32);
    }

    #[test]
    fn parse_short_flags_and_preflight() {
        let cli = Cli::parse_from(["ci", "-c", "debug", "-a", "x64", "--check-codegen"]);
        assert_eq!(cli.config, BuildConfig::Debug);
        assert_eq!(cli.arch, TargetArch::X64);
        assert!(cli.check_codegen);
    }
}
