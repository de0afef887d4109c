//! `envstrap plan` shows the resolved run without executing it.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::support::Project;

#[test]
fn test_plan_lists_steps_without_running_them() {
    let project = Project::new();

    project
        .envstrap()
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. install isolation tool"))
        .stdout(predicate::str::contains("-m pip install virtualenv"))
        .stdout(predicate::str::contains("5. run verification"))
        .stdout(predicate::str::contains("envstrap.log"));

    assert!(!project.log_path().exists());
    assert!(!project.path().join("venv").exists());
}

#[test]
fn test_plan_json_has_paths_and_commands() {
    let project = Project::new();
    let output = project
        .envstrap()
        .args(["plan", "--json"])
        .output()
        .expect("run envstrap");
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json plan");
    let log_file = plan["paths"]["log_file"].as_str().expect("log_file");
    assert!(log_file.ends_with("envstrap.log"));
    assert_eq!(plan["failure_policy"], "continue");
    assert_eq!(plan["steps"].as_array().map(Vec::len), Some(5));
    assert!(plan["steps"][2]["command"].is_null());
}

#[test]
fn test_plan_json_reports_config_error_as_json() {
    let project = Project::new();
    project.write("envstrap.yaml", "failure_policy: sometimes\n");

    let output = project
        .envstrap()
        .args(["plan", "--json"])
        .output()
        .expect("run envstrap");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json error");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "config_error");
    assert!(value["message"].as_str().is_some_and(|m| m.contains("cannot parse")));
}
