//! bench-provision: build-time provisioner for AutoML benchmarking environments.
//!
//! This library resolves which framework setup procedure a container build
//! needs, selects the benchmark package install source, and runs the
//! provisioning steps sequentially before handing control to the entrypoint.

// Core modules
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod params;
pub mod provision;

// Re-export commonly used types
pub use dispatch::{PackageSource, SetupInvocation};
pub use error::ProvisionError;
pub use params::BuildParams;
