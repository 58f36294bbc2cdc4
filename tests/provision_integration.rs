//! Integration tests for the provisioner.
//!
//! These tests run the full step sequence against stub shell scripts in a
//! temporary checkout, recording every invocation to a log file.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use bench_provision::error::ProvisionError;
use bench_provision::params::BuildParams;
use bench_provision::provision::Provisioner;
use tempfile::TempDir;

/// Writes an executable shell script at `path`.
fn write_script(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A stub checkout with fake python, installer, setup and entrypoint scripts
/// that append their invocations to `log`.
struct StubCheckout {
    root: TempDir,
    log: PathBuf,
}

impl StubCheckout {
    fn new(framework_path: &str, setup_exit_code: i32) -> Self {
        let root = TempDir::new().unwrap();
        let log = root.path().join("invocations.log");
        let log_str = log.display().to_string();

        // Fake python: records the venv call and fabricates the venv's pip,
        // which in turn records the install call.
        let pip_body = format!("echo \"pip $@\" >> {}", log_str);
        write_script(
            &root.path().join("bin/python3"),
            &format!(
                "echo \"python $@\" >> {log}\nmkdir -p \"$3/bin\"\nprintf '#!/bin/sh\\n{pip}\\n' > \"$3/bin/pip\"\nchmod +x \"$3/bin/pip\"",
                log = log_str,
                pip = pip_body,
            ),
        );

        write_script(
            &root.path().join("tools/install_awscli.sh"),
            &format!("echo \"awscli\" >> {}", log_str),
        );
        write_script(
            &root.path().join(framework_path).join("setup.sh"),
            &format!(
                "echo \"setup $@\" >> {}\nexit {}",
                log_str, setup_exit_code
            ),
        );
        write_script(
            &root.path().join("entrypoint.sh"),
            &format!("echo \"entrypoint region=$AWS_DEFAULT_REGION\" >> {}", log_str),
        );

        Self { root, log }
    }

    fn provisioner(&self, params: BuildParams) -> Provisioner {
        Provisioner::new(params, self.root.path())
            .with_python(self.root.path().join("bin/python3").display().to_string())
    }

    fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[tokio::test]
async fn test_full_tabular_run_invokes_every_step_in_order() {
    let checkout = StubCheckout::new("frameworks/tabular", 0);
    let venv = checkout.root.path().join("venv");

    let params = BuildParams::new("1.2.0", "frameworks/tabular", &venv)
        .with_git("https://github.com/openml/automlbenchmark.git", "stable")
        .with_amlb_framework("AutoGluon")
        .with_amlb_user_dir("/custom/configs")
        .with_region("us-west-2");

    checkout.provisioner(params).run().await.unwrap();

    let lines = checkout.log_lines();
    assert_eq!(lines.len(), 5, "unexpected log: {:?}", lines);
    assert_eq!(lines[0], format!("python -m venv {}", venv.display()));
    assert_eq!(lines[1], "pip install autogluon.bench==1.2.0");
    assert_eq!(lines[2], "awscli");
    assert_eq!(
        lines[3],
        format!(
            "setup https://github.com/openml/automlbenchmark.git stable {} AutoGluon /custom/configs",
            venv.display()
        )
    );
    assert_eq!(lines[4], "entrypoint region=us-west-2");
}

#[tokio::test]
async fn test_dev_version_installs_from_local_checkout() {
    let checkout = StubCheckout::new("frameworks/multimodal", 0);
    let venv = checkout.root.path().join("venv");

    let params = BuildParams::new("1.3.0dev2", "frameworks/multimodal", &venv)
        .with_git("https://github.com/example/bench.git", "main");

    checkout.provisioner(params).run().await.unwrap();

    let lines = checkout.log_lines();
    assert_eq!(lines[1], "pip install .");
    // Multimodal setup receives the version string as its fourth argument.
    assert_eq!(
        lines[3],
        format!(
            "setup https://github.com/example/bench.git main {} 1.3.0dev2",
            venv.display()
        )
    );
}

#[tokio::test]
async fn test_unrecognized_framework_skips_setup_but_completes() {
    let checkout = StubCheckout::new("frameworks/tabular", 0);
    let venv = checkout.root.path().join("venv");

    // Setup script exists for tabular, but the framework path matches nothing.
    let params = BuildParams::new("1.2.0", "frameworks/other", &venv);

    checkout.provisioner(params).run().await.unwrap();

    let lines = checkout.log_lines();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| !l.starts_with("setup")));
    assert!(lines[3].starts_with("entrypoint"));
}

#[tokio::test]
async fn test_setup_failure_aborts_before_entrypoint() {
    let checkout = StubCheckout::new("frameworks/timeseries", 7);
    let venv = checkout.root.path().join("venv");

    let params = BuildParams::new("1.2.0", "frameworks/timeseries", &venv)
        .with_git("https://github.com/openml/automlbenchmark.git", "stable")
        .with_amlb_framework("AutoGluon");

    let err = checkout.provisioner(params).run().await.unwrap_err();
    match err {
        ProvisionError::StepFailed { step, code } => {
            assert_eq!(step, "framework-setup");
            assert_eq!(code, 7);
        }
        other => panic!("Expected StepFailed, got: {:?}", other),
    }

    // The entrypoint never ran.
    let lines = checkout.log_lines();
    assert!(lines.iter().all(|l| !l.starts_with("entrypoint")));
}
