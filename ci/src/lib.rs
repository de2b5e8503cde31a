//! Build-and-test orchestration for the layer validation stack.
//!
//! The pipeline acquires, builds, and wires together four native projects
//! (the validation layers in this repository, the loader, the mock device
//! driver, and the layer validation test binary) in dependency order, then
//! runs the tests against the mock driver. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (build parameters, path layout,
//!   command descriptors). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (process execution, source
//!   acquisition, native builds, runtime environment assembly). Isolated
//!   behind the [`io::process::CommandRunner`] seam to enable mocking in
//!   tests.
//!
//! [`pipeline`] coordinates core logic with I/O to implement the CI command.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
