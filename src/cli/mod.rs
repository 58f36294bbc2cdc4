//! Command-line interface for bench-provision.
//!
//! Provides the provisioning run command and a resolution dry-run for
//! inspecting the dispatch decision.

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
