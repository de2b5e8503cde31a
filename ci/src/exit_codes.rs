//! Stable exit codes for the ci binary.

/// Full pipeline success.
pub const OK: i32 = 0;
/// Failure with no child exit code to propagate (spawn errors, bad config).
///
/// When an external command fails, its own exit code is used instead,
/// untranslated.
pub const FAILURE: i32 = 1;
