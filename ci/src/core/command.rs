//! Structured description of one external command invocation.
//!
//! Every invocation is an explicit token list plus working directory and
//! environment overlay, never an interpolated shell string, so there is no
//! quoting/splitting hazard and the execution seam can be mocked.

use std::path::PathBuf;

/// One external process invocation. Ephemeral: constructed per stage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command tokens; the first token is the program.
    pub tokens: Vec<String>,
    /// Working directory for the child process. Build systems resolve
    /// relative arguments against it, so it must be exact.
    pub cwd: PathBuf,
    /// Environment overlay applied on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Echo the command line before execution.
    pub verbose: bool,
}

impl Invocation {
    pub fn new<I, S>(tokens: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            env: Vec::new(),
            verbose: true,
        }
    }

    /// Space-joined command line for echoing and error messages.
    pub fn command_line(&self) -> String {
        self.tokens.join(" ")
    }
}
