//! Sequential provisioning of the benchmarking environment.
//!
//! Runs the build steps one after another: virtual environment creation,
//! benchmark package install, AWS CLI install, the dispatched framework
//! setup, and finally the entrypoint handoff. Any non-zero exit aborts the
//! whole run with the external exit status preserved.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::dispatch::{self, PackageSource};
use crate::error::ProvisionError;
use crate::params::BuildParams;

/// Relative path of the AWS CLI installer script under the checkout root.
pub const AWSCLI_INSTALLER: &str = "tools/install_awscli.sh";

/// Relative path of the entrypoint script under the checkout root.
pub const ENTRYPOINT: &str = "entrypoint.sh";

/// File name of a framework's setup script inside its framework directory.
pub const SETUP_SCRIPT: &str = "setup.sh";

/// Environment variable the entrypoint reads the deployment region from.
pub const REGION_ENV: &str = "AWS_DEFAULT_REGION";

/// A single external invocation in the provisioning sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Short name used in logs and error reports.
    pub name: String,
    /// Program to execute.
    pub program: String,
    /// Positional arguments, in order.
    pub args: Vec<String>,
    /// Environment entries set on this child only.
    pub env: Vec<(String, String)>,
}

impl Step {
    fn new(name: &str, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            program: program.into(),
            args,
            env: Vec::new(),
        }
    }

    fn with_env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }
}

/// Sequential runner for the provisioning steps.
pub struct Provisioner {
    params: BuildParams,
    /// Checkout root: framework directories, installer and entrypoint
    /// scripts live under here, and it is the cwd for every step.
    root_dir: PathBuf,
    /// Python interpreter used to create the virtual environment.
    python: String,
}

impl Provisioner {
    /// Creates a provisioner rooted at the given checkout directory.
    pub fn new(params: BuildParams, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            params,
            root_dir: root_dir.into(),
            python: "python3".to_string(),
        }
    }

    /// Overrides the Python interpreter.
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// Builds the ordered step plan without executing anything.
    ///
    /// The setup step is omitted when dispatch resolves to a no-op; the
    /// remaining steps always appear, in fixed order.
    pub fn plan(&self) -> Vec<Step> {
        let venv_dir = self.params.venv_base_dir.display().to_string();
        let pip = self.params.venv_base_dir.join("bin").join("pip");
        let source = dispatch::package_source(&self.params.agbench_version);

        let mut steps = vec![
            Step::new(
                "create-venv",
                self.python.clone(),
                vec!["-m".to_string(), "venv".to_string(), venv_dir],
            ),
            Step::new(
                "install-bench-package",
                pip.display().to_string(),
                vec!["install".to_string(), source.pip_requirement()],
            ),
            Step::new(
                "install-awscli",
                "bash",
                vec![self.root_dir.join(AWSCLI_INSTALLER).display().to_string()],
            ),
        ];

        let invocation = dispatch::resolve(&self.params);
        if let Some(args) = invocation.script_args() {
            let script = self
                .root_dir
                .join(&self.params.framework_path)
                .join(SETUP_SCRIPT);
            let mut script_args = vec![script.display().to_string()];
            script_args.extend(args);
            steps.push(Step::new("framework-setup", "bash", script_args));
        } else {
            info!(
                "No setup step for framework path '{}'",
                self.params.framework_path
            );
        }

        let mut entrypoint = Step::new(
            "entrypoint",
            "bash",
            vec![self.root_dir.join(ENTRYPOINT).display().to_string()],
        );
        if let Some(region) = &self.params.deploy_region {
            entrypoint = entrypoint.with_env(REGION_ENV, region);
        }
        steps.push(entrypoint);

        steps
    }

    /// Runs all steps in order, stopping at the first failure.
    pub async fn run(&self) -> Result<(), ProvisionError> {
        let source = dispatch::package_source(&self.params.agbench_version);
        let invocation = dispatch::resolve(&self.params);
        info!(
            "Provisioning '{}' (package source: {}, setup: {})",
            self.params.framework_path,
            match &source {
                PackageSource::LocalSource => "local checkout".to_string(),
                PackageSource::Published { version } => format!("release {}", version),
            },
            if invocation.is_noop() { "none" } else { "yes" },
        );

        for step in self.plan() {
            self.run_step(&step).await?;
        }

        info!("Provisioning complete, entrypoint finished");
        Ok(())
    }

    /// Runs one step to completion, mapping its exit status.
    async fn run_step(&self, step: &Step) -> Result<(), ProvisionError> {
        debug!("Running step '{}': {} {:?}", step.name, step.program, step.args);

        let status = tokio::process::Command::new(&step.program)
            .args(&step.args)
            .envs(step.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.root_dir)
            .status()
            .await
            .map_err(|e| ProvisionError::Spawn {
                step: step.name.clone(),
                source: e,
            })?;

        match status.code() {
            Some(0) => {
                info!("Step '{}' finished", step.name);
                Ok(())
            }
            Some(code) => Err(ProvisionError::StepFailed {
                step: step.name.clone(),
                code,
            }),
            None => Err(ProvisionError::StepKilled {
                step: step.name.clone(),
            }),
        }
    }

    /// Returns the path of the setup script the plan would invoke, if any.
    pub fn setup_script_path(&self) -> Option<PathBuf> {
        if dispatch::resolve(&self.params).is_noop() {
            None
        } else {
            Some(
                self.root_dir
                    .join(&self.params.framework_path)
                    .join(SETUP_SCRIPT),
            )
        }
    }

    /// The checkout root this provisioner operates in.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}
