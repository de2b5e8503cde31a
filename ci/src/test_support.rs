//! Test-only doubles for pipeline execution.

use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::command::Invocation;
use crate::core::paths::Paths;
use crate::io::process::{CommandFailed, CommandRunner};

type Predicate = Box<dyn Fn(&Invocation) -> bool>;
type Effect = Box<dyn Fn(&Invocation)>;

/// [`CommandRunner`] that records invocations instead of spawning processes.
///
/// `git clone` invocations create their destination directory, so presence
/// checks behave as they would after a real clone. Failures and filesystem
/// side effects (files a real tool would write) can be scripted against
/// matching invocations.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    failures: Vec<(Predicate, i32)>,
    effects: Vec<(Predicate, Effect)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every invocation whose command line contains `needle`.
    pub fn fail_on(&mut self, needle: &str, code: i32) {
        let needle = needle.to_string();
        self.fail_when(move |invocation| invocation.command_line().contains(&needle), code);
    }

    /// Fail every invocation matching `predicate` with the given exit code.
    pub fn fail_when<F>(&mut self, predicate: F, code: i32)
    where
        F: Fn(&Invocation) -> bool + 'static,
    {
        self.failures.push((Box::new(predicate), code));
    }

    /// Run `effect` for every invocation whose command line contains
    /// `needle`, standing in for the files a real tool would produce.
    pub fn effect_on<F>(&mut self, needle: &str, effect: F)
    where
        F: Fn(&Invocation) + 'static,
    {
        let needle = needle.to_string();
        self.effects.push((
            Box::new(move |invocation: &Invocation| {
                invocation.command_line().contains(&needle)
            }),
            Box::new(effect),
        ));
    }

    /// All recorded invocations, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines of all recorded invocations, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    /// Number of recorded command lines containing `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls.borrow_mut().push(invocation.clone());

        if invocation.tokens.len() >= 4
            && invocation.tokens[0] == "git"
            && invocation.tokens[1] == "clone"
        {
            let dest = PathBuf::from(&invocation.tokens[3]);
            std::fs::create_dir_all(&dest).expect("create clone destination");
        }

        for (predicate, effect) in &self.effects {
            if predicate(invocation) {
                effect(invocation);
            }
        }

        for (predicate, code) in &self.failures {
            if predicate(invocation) {
                return Err(CommandFailed {
                    command: invocation.command_line(),
                    code: *code,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Paths rooted in a fresh temp directory, plus the guard keeping it alive.
pub fn temp_paths() -> (tempfile::TempDir, Paths) {
    let temp = tempfile::tempdir().expect("tempdir");
    let paths = Paths::new(temp.path(), "external", "build");
    (temp, paths)
}
