//! CLI command definitions for bench-provision.
//!
//! Every build parameter is a flag with an environment-variable fallback
//! matching the container build-arg names, so the tool works unchanged
//! whether invoked from a RUN line or by hand.

use clap::Parser;
use serde_json::json;
use tracing::info;

use crate::dispatch;
use crate::params::{non_empty, BuildParams};
use crate::provision::Provisioner;

/// Default virtual-environment root inside the container.
const DEFAULT_VENV_BASE_DIR: &str = "/opt/bench/venv";

/// Build-time provisioner for AutoML benchmarking environments.
#[derive(Parser)]
#[command(name = "bench-provision")]
#[command(about = "Provision an AutoML benchmarking environment at container build time")]
#[command(version)]
#[command(
    long_about = "bench-provision creates the virtual environment, installs the benchmark package (from a local checkout for dev versions, otherwise the pinned release), installs the AWS CLI, runs the framework setup script selected from the framework path, and hands control to the entrypoint.\n\nExample usage:\n  bench-provision provision --agbench-version 1.2.0 --framework-path frameworks/tabular --amlb-framework AutoGluon"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the full provisioning sequence and hand off to the entrypoint.
    #[command(alias = "run")]
    Provision(ProvisionArgs),

    /// Print the resolved setup invocation and package source as JSON.
    ///
    /// Never fails on an unrecognized framework path; the no-op outcome is
    /// reported like any other.
    Resolve(ParamArgs),
}

/// The build parameter surface, shared by both subcommands.
#[derive(Parser, Debug)]
pub struct ParamArgs {
    /// Version of the benchmark package; a "dev" version installs from the
    /// local checkout instead of the package index.
    #[arg(long, env = "AG_BENCH_VERSION")]
    pub agbench_version: String,

    /// Framework category path (e.g. "frameworks/tabular"); selects the
    /// setup branch by substring match.
    #[arg(long, env = "FRAMEWORK_PATH")]
    pub framework_path: String,

    /// Git URI forwarded unchanged to the setup script.
    #[arg(long, env = "GIT_URI")]
    pub git_uri: Option<String>,

    /// Git branch forwarded unchanged to the setup script.
    #[arg(long, env = "GIT_BRANCH")]
    pub git_branch: Option<String>,

    /// Virtual-environment root directory.
    #[arg(long, env = "AG_BENCH_BASE_DIR", default_value = DEFAULT_VENV_BASE_DIR)]
    pub venv_base_dir: String,

    /// Framework name forwarded to the tabular/timeseries setup.
    #[arg(long, env = "AMLB_FRAMEWORK")]
    pub amlb_framework: Option<String>,

    /// Optional user-directory override for the tabular/timeseries setup.
    #[arg(long, env = "AMLB_USER_DIR")]
    pub amlb_user_dir: Option<String>,

    /// Deployment region, set on the entrypoint's environment only.
    #[arg(long, env = "CDK_DEPLOY_REGION")]
    pub region: Option<String>,
}

/// Arguments for `bench-provision provision`.
#[derive(Parser, Debug)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Checkout root: framework directories, installer and entrypoint
    /// scripts are resolved relative to this directory.
    #[arg(long, default_value = ".")]
    pub root_dir: String,

    /// Python interpreter used to create the virtual environment.
    #[arg(long, default_value = "python3")]
    pub python: String,

    /// Print the step plan as JSON without executing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl ParamArgs {
    /// Converts the raw CLI surface into the immutable parameter set.
    ///
    /// Empty strings on optional args behave the same as omitted args,
    /// since build systems forward unset build args as "".
    fn into_params(self) -> BuildParams {
        let mut params = BuildParams::new(
            self.agbench_version,
            self.framework_path,
            self.venv_base_dir,
        );
        params.git_uri = non_empty(self.git_uri);
        params.git_branch = non_empty(self.git_branch);
        params.amlb_framework = non_empty(self.amlb_framework);
        params.amlb_user_dir = non_empty(self.amlb_user_dir);
        params.deploy_region = non_empty(self.region);
        params
    }
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses CLI arguments and runs the selected command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Runs the selected command with already-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Provision(args) => {
            let params = args.params.into_params();
            info!(
                "Build parameters: {}",
                serde_json::to_string(&params)?
            );

            let provisioner =
                Provisioner::new(params, args.root_dir).with_python(args.python);

            if args.dry_run {
                println!("{}", serde_json::to_string_pretty(&provisioner.plan())?);
                return Ok(());
            }

            provisioner.run().await?;
            Ok(())
        }
        Commands::Resolve(args) => {
            let params = args.into_params();
            let output = json!({
                "invocation": dispatch::resolve(&params),
                "package_source": dispatch::package_source(&params.agbench_version),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}
