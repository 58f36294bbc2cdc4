//! Setup dispatch for framework provisioning.
//!
//! This module holds the one piece of real decision logic in the build
//! recipe: given the build parameters, resolve which framework setup script
//! runs and with what positional arguments, and which source the benchmark
//! package installs from. Resolution happens once and the result is never
//! revisited.

use serde::{Deserialize, Serialize};

use crate::params::BuildParams;

/// Substring selecting the tabular setup branch.
pub const PATTERN_TABULAR: &str = "tabular";

/// Substring selecting the timeseries setup branch (same branch as tabular).
pub const PATTERN_TIMESERIES: &str = "timeseries";

/// Substring selecting the multimodal setup branch.
pub const PATTERN_MULTIMODAL: &str = "multimodal";

/// Published name of the benchmarking package on the package index.
pub const PACKAGE_NAME: &str = "autogluon.bench";

/// The resolved decision of which setup procedure to run.
///
/// Exactly one variant is produced per build. `NoOp` is a deliberate outcome
/// for framework categories that need no extra setup step, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "setup", rename_all = "snake_case")]
pub enum SetupInvocation {
    /// Tabular/timeseries setup: four positional arguments, five when a
    /// user-directory override is present.
    TabularTimeseries {
        git_uri: String,
        git_branch: String,
        venv_base_dir: String,
        framework: String,
        user_dir: Option<String>,
    },
    /// Multimodal setup: four positional arguments, the fourth being the
    /// benchmark package version rather than a framework name.
    Multimodal {
        git_uri: String,
        git_branch: String,
        venv_base_dir: String,
        version: String,
    },
    /// No setup procedure required for this framework category.
    NoOp,
}

impl SetupInvocation {
    /// Returns the positional argument list for the setup script, or `None`
    /// for the no-op outcome.
    ///
    /// The external script contract is positional: optional values that were
    /// absent at resolve time appear as empty strings, except the trailing
    /// user-dir argument which is omitted entirely when absent.
    pub fn script_args(&self) -> Option<Vec<String>> {
        match self {
            Self::TabularTimeseries {
                git_uri,
                git_branch,
                venv_base_dir,
                framework,
                user_dir,
            } => {
                let mut args = vec![
                    git_uri.clone(),
                    git_branch.clone(),
                    venv_base_dir.clone(),
                    framework.clone(),
                ];
                if let Some(dir) = user_dir {
                    args.push(dir.clone());
                }
                Some(args)
            }
            Self::Multimodal {
                git_uri,
                git_branch,
                venv_base_dir,
                version,
            } => Some(vec![
                git_uri.clone(),
                git_branch.clone(),
                venv_base_dir.clone(),
                version.clone(),
            ]),
            Self::NoOp => None,
        }
    }

    /// Whether this invocation runs no setup script.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Resolves the setup invocation for the given build parameters.
///
/// Matching is substring containment, case-sensitive, first match wins:
/// tabular/timeseries before multimodal. A path matching neither pattern
/// resolves to [`SetupInvocation::NoOp`]. No argument contents are validated.
pub fn resolve(params: &BuildParams) -> SetupInvocation {
    let git_uri = params.git_uri.clone().unwrap_or_default();
    let git_branch = params.git_branch.clone().unwrap_or_default();
    let venv_base_dir = params.venv_base_dir.display().to_string();

    if params.framework_path.contains(PATTERN_TABULAR)
        || params.framework_path.contains(PATTERN_TIMESERIES)
    {
        SetupInvocation::TabularTimeseries {
            git_uri,
            git_branch,
            venv_base_dir,
            framework: params.amlb_framework.clone().unwrap_or_default(),
            user_dir: params
                .amlb_user_dir
                .clone()
                .filter(|dir| !dir.is_empty()),
        }
    } else if params.framework_path.contains(PATTERN_MULTIMODAL) {
        SetupInvocation::Multimodal {
            git_uri,
            git_branch,
            venv_base_dir,
            version: params.agbench_version.clone(),
        }
    } else {
        SetupInvocation::NoOp
    }
}

/// Where the benchmark package installs from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PackageSource {
    /// Install from the local checkout (current working directory).
    LocalSource,
    /// Install the named published release.
    Published { version: String },
}

impl PackageSource {
    /// Returns the pip requirement specifier for this source.
    pub fn pip_requirement(&self) -> String {
        match self {
            Self::LocalSource => ".".to_string(),
            Self::Published { version } => format!("{}=={}", PACKAGE_NAME, version),
        }
    }
}

/// Selects the package install source from the version string.
///
/// A version containing the substring "dev" signals an install from the
/// local checkout; anything else pins the published release of that version.
pub fn package_source(version: &str) -> PackageSource {
    if version.contains("dev") {
        PackageSource::LocalSource
    } else {
        PackageSource::Published {
            version: version.to_string(),
        }
    }
}
