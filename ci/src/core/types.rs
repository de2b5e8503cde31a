//! Build parameters shared by every pipeline stage.

use std::fmt;

use clap::ValueEnum;

/// Build configuration for the native projects.
///
/// The lowercase name is the CLI spelling and the value passed to the build
/// system's compile step; [`BuildConfig::build_type`] is the capitalized
/// spelling used for the configure-time build type and per-configuration
/// output directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BuildConfig {
    #[default]
    Release,
    Debug,
}

impl BuildConfig {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildConfig::Release => "release",
            BuildConfig::Debug => "debug",
        }
    }

    /// Capitalized form consumed by the native build system.
    pub fn build_type(self) -> &'static str {
        match self {
            BuildConfig::Release => "Release",
            BuildConfig::Debug => "Debug",
        }
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target architecture selector, consulted on Windows hosts only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TargetArch {
    #[default]
    #[value(name = "x64")]
    X64,
    #[value(name = "Win32")]
    Win32,
}

impl TargetArch {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetArch::X64 => "x64",
            TargetArch::Win32 => "Win32",
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
