//! External process execution behind a mockable seam.
//!
//! Stages describe work as [`Invocation`]s; the [`CommandRunner`] in use
//! decides how they run. The real runner inherits stdio so build and tool
//! output streams live to the console, and surfaces any non-zero exit as a
//! fatal [`CommandFailed`] carrying the child's code. There is no retry and
//! no timeout: transient flakiness means re-invoking the whole pipeline, and
//! a hung child hangs the run.

use std::process::Command;

use anyhow::{Context, Result, bail};
use thiserror::Error;
use tracing::debug;

use crate::core::command::Invocation;
use crate::exit_codes;

/// A command ran to completion but exited unsuccessfully.
///
/// The code is preserved unaltered so the pipeline can exit with it.
#[derive(Debug, Error)]
#[error("`{command}` exited with code {code}")]
pub struct CommandFailed {
    pub command: String,
    pub code: i32,
}

/// Execution seam for everything the pipeline spawns.
pub trait CommandRunner {
    /// Run the invocation to completion. Non-zero exit is an error.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        (**self).run(invocation)
    }
}

/// Runner that spawns the real child process with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let Some(program) = invocation.tokens.first() else {
            bail!("empty invocation");
        };
        if invocation.verbose {
            println!("+ {}", invocation.command_line());
        }
        debug!(
            command = %invocation.command_line(),
            cwd = %invocation.cwd.display(),
            "spawning"
        );
        let mut cmd = Command::new(program);
        cmd.args(&invocation.tokens[1..])
            .current_dir(&invocation.cwd);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }
        let status = cmd
            .status()
            .with_context(|| format!("spawn `{}`", invocation.command_line()))?;
        if !status.success() {
            // A signal-terminated child has no code; 1 stands in.
            let code = status.code().unwrap_or(1);
            return Err(CommandFailed {
                command: invocation.command_line(),
                code,
            }
            .into());
        }
        Ok(())
    }
}

/// Exit code the process should terminate with for `err`.
///
/// A [`CommandFailed`] anywhere in the chain wins: the child's exit code is
/// propagated without translation.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CommandFailed>() {
        Some(failed) => failed.code,
        None => exit_codes::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        let mut invocation = Invocation::new(["sh", "-c", script], std::env::temp_dir());
        invocation.verbose = false;
        invocation
    }

    #[test]
    fn zero_exit_is_ok() {
        ShellRunner.run(&sh("exit 0")).expect("success");
    }

    #[test]
    fn nonzero_exit_code_is_preserved() {
        let err = ShellRunner.run(&sh("exit 7")).expect_err("failure");
        let failed = err.downcast_ref::<CommandFailed>().expect("typed error");
        assert_eq!(failed.code, 7);
        assert_eq!(exit_code_for(&err), 7);
    }

    #[test]
    fn exit_code_survives_added_context() {
        let err = ShellRunner
            .run(&sh("exit 5"))
            .context("stage failed")
            .expect_err("failure");
        assert_eq!(exit_code_for(&err), 5);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let mut invocation =
            Invocation::new(["ci-test-no-such-program"], std::env::temp_dir());
        invocation.verbose = false;
        let err = ShellRunner.run(&invocation).expect_err("spawn failure");
        assert!(err.downcast_ref::<CommandFailed>().is_none());
        assert_eq!(exit_code_for(&err), exit_codes::FAILURE);
    }

    #[test]
    fn overlay_variables_reach_the_child() {
        let mut invocation = Invocation::new(
            ["sh", "-c", "test \"$CI_PROBE\" = probe-value"],
            std::env::temp_dir(),
        );
        invocation.verbose = false;
        invocation.env = vec![("CI_PROBE".to_string(), "probe-value".to_string())];
        ShellRunner.run(&invocation).expect("overlay visible");
    }
}
