// ABOUTME: Integration tests for the stackplan CLI commands.
// ABOUTME: Runs the binary against temporary projects created with init.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn stackplan_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("stackplan"))
}

/// A temporary project initialised from the template manifest.
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    stackplan_cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

#[test]
fn help_shows_commands() {
    stackplan_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("params"));
}

#[test]
fn init_creates_config_file() {
    let dir = project();
    let content = fs::read_to_string(dir.path().join("stackplan.yml")).unwrap();
    assert!(content.contains("namespace: /api"));
    assert!(content.contains("green-blue-fargate"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn plan_lists_stacks_in_dependency_order() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["plan", "--quiet"])
        .assert()
        .success()
        .stdout("ssl-certificate\necr\ngreen-blue-fargate\na-record\ndeployment-pipeline\n");
}

#[test]
fn plan_json_is_machine_readable() {
    let dir = project();

    let output = stackplan_cmd()
        .current_dir(dir.path())
        .args(["plan", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = plan["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[2]["stack"], "green-blue-fargate");
    let after: Vec<&str> = steps[2]["after"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(after, vec!["ssl-certificate", "ecr"]);
}

#[test]
fn validate_reports_spot_capacity_warning() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manifest is valid: 5 stack(s)"))
        .stderr(predicate::str::contains("spot capacity"));
}

#[test]
fn validate_rejects_cycles() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("stackplan.yml"),
        r#"
stacks:
  - name: a
    reads: [y]
    writes: [x]
  - name: b
    reads: [x]
    writes: [y]
"#,
    )
    .unwrap();

    stackplan_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cyclic dependency: a -> b -> a"));
}

#[test]
fn config_flag_points_at_manifest() {
    let dir = project();
    let elsewhere = tempfile::tempdir().unwrap();

    stackplan_cmd()
        .current_dir(elsewhere.path())
        .arg("--config")
        .arg(dir.path().join("stackplan.yml"))
        .args(["plan", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ssl-certificate\n"));
}

#[test]
fn apply_dry_run_warns_about_unseeded_externals() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["apply", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 5 stack(s) would be applied"))
        .stderr(predicate::str::contains("/api/hostedZoneId has no value"));
}

#[test]
fn apply_without_provisioner_fails() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .arg("apply")
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest declares no provisioner"));
}

#[test]
fn params_put_then_get() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["params", "put", "hostedZoneId", "Z0123"])
        .assert()
        .success();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["params", "get", "/api/hostedZoneId"])
        .assert()
        .success()
        .stdout("Z0123\n");

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["params", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/api/hostedZoneId = Z0123"));
}

#[test]
fn params_get_missing_fails() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["params", "get", "albArn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parameter not found: /api/albArn"));
}

#[test]
fn seed_writes_literal_externals() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("stackplan.yml"),
        r#"
externals:
  hostedZoneId: Z0123
  hostedZoneName:
stacks:
  - name: a-record
    reads: [hostedZoneId, hostedZoneName]
"#,
    )
    .unwrap();

    stackplan_cmd()
        .current_dir(dir.path())
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 1 parameter(s)"));

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["params", "get", "hostedZoneId"])
        .assert()
        .success()
        .stdout("Z0123\n");
}

#[test]
fn apply_runs_provisioner_command() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("stackplan.yml"),
        r#"
stacks:
  - name: dns
    reads: [ecrRepositoryArn]
  - name: ecr
    writes: [ecrRepositoryArn]
provisioner:
  command: ["sh", "-c", "if [ \"$STACKPLAN_STACK\" = ecr ]; then echo '{\"ecrRepositoryArn\": \"arn:repo\"}'; fi"]
  timeout: 10s
"#,
    )
    .unwrap();

    stackplan_cmd()
        .current_dir(dir.path())
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 2 stack(s)"));

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["params", "get", "ecrRepositoryArn"])
        .assert()
        .success()
        .stdout("arn:repo\n");
}

#[test]
fn artifacts_renders_both_files() {
    let dir = project();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["params", "put", "ecsRoleArn", "arn:aws:iam::1:role/ecs"])
        .assert()
        .success();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["artifacts", "--out", "dist"])
        .assert()
        .success();

    let taskdef = fs::read_to_string(dir.path().join("dist/taskdef.json")).unwrap();
    assert!(taskdef.contains("arn:aws:iam::1:role/ecs"));
    assert!(dir.path().join("dist/appspec.json").exists());
}

#[test]
fn artifacts_without_role_omits_role_fields() {
    let dir = project();
    let manifest = dir.path().join("stackplan.yml");
    let content = fs::read_to_string(&manifest).unwrap();
    assert!(content.contains("      execution_role: ecsRoleArn\n"));
    fs::write(&manifest, content.replace("      execution_role: ecsRoleArn\n", "")).unwrap();

    stackplan_cmd()
        .current_dir(dir.path())
        .args(["artifacts", "--out", "dist"])
        .assert()
        .success();

    let taskdef = fs::read_to_string(dir.path().join("dist/taskdef.json")).unwrap();
    assert!(!taskdef.contains("RoleArn"));
    assert!(taskdef.contains("<IMAGE1_NAME>"));
}
