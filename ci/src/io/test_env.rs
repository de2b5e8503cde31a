//! Runtime environment assembly and test execution.
//!
//! The test binary locates the freshly built pieces through three
//! environment variables: the dynamic-library search path (loader
//! libraries), the layer search path (plugins), and the driver-manifest
//! path (mock device). Everything else is inherited unchanged from the
//! ambient environment.

use anyhow::Result;

use crate::core::command::Invocation;
use crate::core::paths::Paths;
use crate::io::process::CommandRunner;

/// Dynamic-library search path consumed by the OS loader.
pub const LIBRARY_PATH_ENV: &str = "LD_LIBRARY_PATH";
/// Layer search path consumed by the loader.
pub const LAYER_PATH_ENV: &str = "LOADER_LAYER_PATH";
/// Driver-manifest location consumed by the loader.
pub const DRIVER_FILES_ENV: &str = "LOADER_DRIVER_FILES";

/// Build the three-variable overlay for a test run.
///
/// Built fresh per call and applied on top of the inherited environment;
/// nothing is cached and the ambient process environment is not touched.
pub fn runtime_env(paths: &Paths) -> Vec<(String, String)> {
    vec![
        (
            LIBRARY_PATH_ENV.to_string(),
            paths.loader_libs().display().to_string(),
        ),
        (
            LAYER_PATH_ENV.to_string(),
            paths.layers_out().display().to_string(),
        ),
        (
            DRIVER_FILES_ENV.to_string(),
            paths.driver_manifest().display().to_string(),
        ),
    ]
}

/// Execute the layer validation tests against the mock driver.
///
/// Runs at the project root with the overlay applied; a failing test
/// binary's exit code surfaces unaltered.
pub fn run_tests<R: CommandRunner>(runner: &R, paths: &Paths) -> Result<()> {
    println!("Run layer validation tests against the mock driver");
    let binary = paths.test_binary().display().to_string();
    let mut invocation = Invocation::new([binary.as_str()], paths.root());
    invocation.env = runtime_env(paths);
    runner.run(&invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingRunner, temp_paths};
    use std::path::Path;

    #[test]
    fn overlay_is_exactly_three_root_derived_paths() {
        let (temp, paths) = temp_paths();
        let env = runtime_env(&paths);

        assert_eq!(env.len(), 3);
        let keys: Vec<&str> = env.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, [LIBRARY_PATH_ENV, LAYER_PATH_ENV, DRIVER_FILES_ENV]);
        for (_, value) in &env {
            assert!(!value.is_empty());
            assert!(Path::new(value).starts_with(temp.path()));
        }
    }

    #[test]
    fn tests_run_at_the_root_with_the_overlay() {
        let (_temp, paths) = temp_paths();
        let runner = RecordingRunner::new();

        run_tests(&runner, &paths).expect("run tests");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].cwd, paths.root());
        assert!(calls[0].tokens[0].ends_with("layer_validation_tests"));
        assert_eq!(calls[0].env, runtime_env(&paths));
    }
}
