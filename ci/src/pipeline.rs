//! Stage sequencing for the full build-and-test pipeline.
//!
//! Stages run in dependency order; the first failure aborts the run and its
//! error (carrying the child exit code, when there is one) propagates to the
//! caller unchanged. Artifacts already on disk are left in place for
//! inspection; there is no rollback.

use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::command::Invocation;
use crate::core::paths::Paths;
use crate::core::types::{BuildConfig, TargetArch};
use crate::io::acquire::{self, Dependency};
use crate::io::build::{self, BuildOptions};
use crate::io::codegen;
use crate::io::config::PipelineConfig;
use crate::io::process::CommandRunner;
use crate::io::test_env;

/// One step of the linear pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AcquireLayerDeps,
    BuildLayer,
    ValidateCoverage,
    AcquireLoaderDeps,
    BuildLoader,
    AcquireDriverDeps,
    GenerateDriverArtifacts,
    BuildDriver,
    CopyDriverManifest,
    RunTests,
}

impl Stage {
    /// Dependency order; the orchestrator runs exactly this sequence.
    pub const SEQUENCE: [Stage; 10] = [
        Stage::AcquireLayerDeps,
        Stage::BuildLayer,
        Stage::ValidateCoverage,
        Stage::AcquireLoaderDeps,
        Stage::BuildLoader,
        Stage::AcquireDriverDeps,
        Stage::GenerateDriverArtifacts,
        Stage::BuildDriver,
        Stage::CopyDriverManifest,
        Stage::RunTests,
    ];

    pub fn describe(self) -> &'static str {
        match self {
            Stage::AcquireLayerDeps => "acquire layer dependencies",
            Stage::BuildLayer => "build validation layers",
            Stage::ValidateCoverage => "collect validation coverage statistics",
            Stage::AcquireLoaderDeps => "acquire loader dependencies",
            Stage::BuildLoader => "build loader",
            Stage::AcquireDriverDeps => "acquire driver dependencies",
            Stage::GenerateDriverArtifacts => "generate mock driver sources",
            Stage::BuildDriver => "build mock driver",
            Stage::CopyDriverManifest => "copy driver manifest",
            Stage::RunTests => "run layer validation tests",
        }
    }
}

/// The orchestrator: everything the stages share.
pub struct Pipeline<R> {
    paths: Paths,
    sources: PipelineConfig,
    config: BuildConfig,
    arch: TargetArch,
    windows_host: bool,
    runner: R,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(
        paths: Paths,
        sources: PipelineConfig,
        config: BuildConfig,
        arch: TargetArch,
        runner: R,
    ) -> Self {
        Self {
            paths,
            sources,
            config,
            arch,
            windows_host: cfg!(windows),
            runner,
        }
    }

    /// Override host-platform detection (tests exercise both branches).
    pub fn set_windows_host(&mut self, windows: bool) {
        self.windows_host = windows;
    }

    /// Run the whole pipeline in order, aborting on the first failure.
    pub fn run(&self) -> Result<()> {
        for stage in Stage::SEQUENCE {
            info!(stage = ?stage, "stage start");
            self.run_stage(stage)
                .with_context(|| format!("stage failed: {}", stage.describe()))?;
        }
        Ok(())
    }

    /// Run one stage in isolation.
    pub fn run_stage(&self, stage: Stage) -> Result<()> {
        match stage {
            Stage::AcquireLayerDeps => self.acquire_layer_deps(),
            Stage::BuildLayer => self.build_layer(),
            Stage::ValidateCoverage => self.validate_coverage(),
            Stage::AcquireLoaderDeps => self.acquire_loader_deps(),
            Stage::BuildLoader => self.build_loader(),
            Stage::AcquireDriverDeps => self.acquire_driver_deps(),
            Stage::GenerateDriverArtifacts => self.generate_driver_artifacts(),
            Stage::BuildDriver => self.build_driver(),
            Stage::CopyDriverManifest => self.copy_driver_manifest(),
            Stage::RunTests => test_env::run_tests(&self.runner, &self.paths),
        }
    }

    /// Verify checked-in generated sources against the registry.
    ///
    /// Advisory pre-flight; no side effects beyond the check itself.
    pub fn check_codegen(&self) -> Result<()> {
        codegen::verify_generated(&self.runner, self.paths.root(), &self.paths.registry())
    }

    fn acquire_layer_deps(&self) -> Result<()> {
        // Doubles as the toolchain probe: a missing build tool fails here,
        // before anything is cloned or configured.
        println!("Log build tool version");
        self.runner
            .run(&Invocation::new(["cmake", "--version"], self.paths.root()))?;

        println!("Resolve layer repository dependencies");
        acquire::update_deps(
            &self.runner,
            self.paths.root(),
            self.paths.external_dir_name(),
            Some((self.config, self.arch)),
        )?;

        let framework = Dependency::new(
            "test framework",
            &self.sources.test_framework,
            self.paths.test_framework(),
        );
        acquire::ensure_present(&self.runner, &framework)?;
        Ok(())
    }

    fn build_layer(&self) -> Result<()> {
        println!("Configure and build the validation layers");
        build::configure_and_build(
            &self.runner,
            &BuildOptions {
                build_dir: self.paths.build(),
                helper_config: Some(format!(
                    "../{}/helper.cmake",
                    self.paths.external_dir_name()
                )),
                defines: Vec::new(),
                target: None,
                config: self.config,
                arch: Some(self.arch),
                windows_host: self.windows_host,
            },
        )
    }

    fn validate_coverage(&self) -> Result<()> {
        println!("Collect validation coverage statistics");
        let out_dir = self.paths.layers_out().join(self.config.build_type());
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("create {}", out_dir.display()))?;

        let script = self.paths.resolve("scripts/validation_stats.py");
        let usage = self.paths.registry().join("valid_usage.json");
        let database = format!(
            "layers/{}/coverage_database.txt",
            self.config.build_type()
        );
        self.runner.run(&Invocation::new(
            [
                "python3",
                script.display().to_string().as_str(),
                usage.display().to_string().as_str(),
                "-text",
                database.as_str(),
            ],
            self.paths.build(),
        ))
    }

    fn acquire_loader_deps(&self) -> Result<()> {
        let loader = Dependency::new("loader", &self.sources.loader, self.paths.loader());
        acquire::ensure_present(&self.runner, &loader)?;

        println!("Resolve loader repository dependencies");
        // The loader resolves into its own default external tree, regardless
        // of how this repository's layout is named.
        acquire::update_deps(&self.runner, &self.paths.loader(), "external", None)
    }

    fn build_loader(&self) -> Result<()> {
        println!("Configure and build the loader");
        build::configure_and_build(
            &self.runner,
            &BuildOptions {
                build_dir: self.paths.loader_build(),
                helper_config: Some("../external/helper.cmake".to_string()),
                defines: Vec::new(),
                target: None,
                config: self.config,
                arch: Some(self.arch),
                windows_host: self.windows_host,
            },
        )
    }

    fn acquire_driver_deps(&self) -> Result<()> {
        let tools = Dependency::new("device tools", &self.sources.tools, self.paths.device_tools());
        acquire::ensure_present(&self.runner, &tools)?;
        Ok(())
    }

    fn generate_driver_artifacts(&self) -> Result<()> {
        println!("Generate mock driver sources");
        let generated = self.paths.device_tools().join("driver").join("generated");
        let registry = self.paths.registry();

        let typemap_script = self.paths.resolve("scripts/generate_source.py");
        codegen::generate(
            &self.runner,
            &typemap_script,
            &registry,
            "api_typemap.h",
            &generated,
        )?;

        let driver_script = self
            .paths
            .device_tools()
            .join("scripts")
            .join("generate_driver.py");
        codegen::generate(
            &self.runner,
            &driver_script,
            &registry,
            "mock_driver.cpp",
            &generated,
        )?;
        codegen::generate(
            &self.runner,
            &driver_script,
            &registry,
            "mock_driver.h",
            &generated,
        )
    }

    fn build_driver(&self) -> Result<()> {
        println!("Configure and build the mock driver");
        let headers_install = self
            .paths
            .external()
            .join("headers")
            .join(self.paths.build_dir_name())
            .join("install");
        build::configure_and_build(
            &self.runner,
            &BuildOptions {
                build_dir: self.paths.device_tools_build(),
                helper_config: None,
                defines: vec![
                    "-DBUILD_DEMOS=NO".to_string(),
                    "-DBUILD_DEVICE_INFO=NO".to_string(),
                    "-DINSTALL_DRIVER=OFF".to_string(),
                    format!("-DAPI_HEADERS_INSTALL_DIR={}", headers_install.display()),
                ],
                target: Some("mock_driver".to_string()),
                config: self.config,
                // The driver configure carries no selector; the headers
                // install dir already pins the ABI.
                arch: None,
                windows_host: self.windows_host,
            },
        )
    }

    fn copy_driver_manifest(&self) -> Result<()> {
        println!("Copy mock driver manifest beside the driver binary");
        let src = self.paths.driver_manifest_source();
        let dst = self.paths.driver_manifest();
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::copy(&src, &dst)
            .with_context(|| format!("copy {} to {}", src.display(), dst.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::process::exit_code_for;
    use crate::test_support::{RecordingRunner, temp_paths};

    #[test]
    fn preflight_failure_surfaces_the_generator_exit_code() {
        let (_temp, paths) = temp_paths();
        let mut runner = RecordingRunner::new();
        runner.fail_on("--verify", 2);
        let pipeline = Pipeline::new(
            paths,
            PipelineConfig::default(),
            BuildConfig::Release,
            TargetArch::X64,
            &runner,
        );

        let err = pipeline.check_codegen().expect_err("stale generated sources");
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn sequence_starts_with_acquisition_and_ends_with_tests() {
        assert_eq!(Stage::SEQUENCE.first(), Some(&Stage::AcquireLayerDeps));
        assert_eq!(Stage::SEQUENCE.last(), Some(&Stage::RunTests));
    }

    #[test]
    fn generation_precedes_the_driver_build_in_the_sequence() {
        let generate = Stage::SEQUENCE
            .iter()
            .position(|stage| *stage == Stage::GenerateDriverArtifacts)
            .expect("generate stage");
        let build = Stage::SEQUENCE
            .iter()
            .position(|stage| *stage == Stage::BuildDriver)
            .expect("driver build stage");
        assert!(generate < build);
    }
}
