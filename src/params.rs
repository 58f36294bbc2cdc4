//! Build-time parameter set for a provisioning run.
//!
//! Mirrors the build-arg surface of the container recipe: all values arrive
//! as free-form strings from the invoking build system and are never mutated
//! after construction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Parameters supplied by the invoking build system.
///
/// Optional values are `None` when the corresponding build arg was absent or
/// empty; required ones are passed through verbatim without validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildParams {
    /// Version string of the benchmarking package itself. Consulted twice:
    /// once to pick the install source, once as a pass-through argument for
    /// the multimodal setup path.
    pub agbench_version: String,
    /// Framework category path, e.g. "frameworks/tabular". Selects which
    /// setup branch runs.
    pub framework_path: String,
    /// Git URI forwarded unchanged to setup scripts.
    pub git_uri: Option<String>,
    /// Git branch forwarded unchanged to setup scripts.
    pub git_branch: Option<String>,
    /// Root directory for the virtual environment.
    pub venv_base_dir: PathBuf,
    /// Framework name forwarded to the tabular/timeseries setup path.
    pub amlb_framework: Option<String>,
    /// Optional user-directory override for the tabular/timeseries path.
    pub amlb_user_dir: Option<String>,
    /// Deployment region, set on the entrypoint's environment only.
    pub deploy_region: Option<String>,
}

impl BuildParams {
    /// Creates a parameter set with the required values; optionals start absent.
    pub fn new(
        agbench_version: impl Into<String>,
        framework_path: impl Into<String>,
        venv_base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            agbench_version: agbench_version.into(),
            framework_path: framework_path.into(),
            git_uri: None,
            git_branch: None,
            venv_base_dir: venv_base_dir.into(),
            amlb_framework: None,
            amlb_user_dir: None,
            deploy_region: None,
        }
    }

    /// Sets the git source coordinates.
    pub fn with_git(mut self, uri: impl Into<String>, branch: impl Into<String>) -> Self {
        self.git_uri = Some(uri.into());
        self.git_branch = Some(branch.into());
        self
    }

    /// Sets the AMLB framework name.
    pub fn with_amlb_framework(mut self, framework: impl Into<String>) -> Self {
        self.amlb_framework = Some(framework.into());
        self
    }

    /// Sets the AMLB user-directory override.
    pub fn with_amlb_user_dir(mut self, dir: impl Into<String>) -> Self {
        self.amlb_user_dir = Some(dir.into());
        self
    }

    /// Sets the deployment region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.deploy_region = Some(region.into());
        self
    }
}

/// Normalizes an optional build arg: empty strings count as absent.
///
/// Build systems commonly forward unset args as `""`, which must behave the
/// same as an omitted arg.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_optionals() {
        let params = BuildParams::new("1.2.0", "frameworks/tabular", "/opt/venvs")
            .with_git("https://github.com/openml/automlbenchmark.git", "master")
            .with_amlb_framework("AutoGluon")
            .with_region("us-west-2");

        assert_eq!(params.git_branch.as_deref(), Some("master"));
        assert_eq!(params.amlb_framework.as_deref(), Some("AutoGluon"));
        assert!(params.amlb_user_dir.is_none());
        assert_eq!(params.deploy_region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_non_empty_filters_blank_args() {
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_params_round_trip_json() {
        let params = BuildParams::new("0.3.1dev", "frameworks/multimodal", "/opt/venvs");
        let json = serde_json::to_string(&params).unwrap();
        let back: BuildParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.agbench_version, "0.3.1dev");
        assert_eq!(back.framework_path, "frameworks/multimodal");
    }
}
