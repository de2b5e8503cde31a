//! Side-effecting adapters for pipeline stages.

pub mod acquire;
pub mod build;
pub mod codegen;
pub mod config;
pub mod process;
pub mod test_env;
