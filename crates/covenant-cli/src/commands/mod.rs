//! Subcommand implementations

pub mod abi;
pub mod chain;
