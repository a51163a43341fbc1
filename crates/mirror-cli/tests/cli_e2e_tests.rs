//! CLI end-to-end tests that invoke the compiled `mirror` binary.
//!
//! Every test runs in its own temporary directory with the global settings
//! directory redirected, so the host's configuration never leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "contexts": [{ "tenantId": "t1", "principal": "spn-mirror" }],
  "managementGroups": [
    {
      "id": "/providers/Microsoft.Management/managementGroups/t1",
      "name": "t1",
      "displayName": "Tenant Root Group",
      "children": [
        { "id": "/providers/Microsoft.Management/managementGroups/platform",
          "name": "platform", "displayName": "Platform", "kind": "ManagementGroup" }
      ]
    },
    {
      "id": "/providers/Microsoft.Management/managementGroups/platform",
      "name": "platform",
      "displayName": "Platform",
      "parentId": "/providers/Microsoft.Management/managementGroups/t1",
      "children": [
        { "id": "/subscriptions/s1", "name": "s1", "displayName": "Connectivity",
          "kind": "Subscription" },
        { "id": "/subscriptions/s2", "name": "s2", "displayName": "Retired",
          "kind": "Subscription" }
      ]
    }
  ],
  "subscriptions": [
    { "id": "s1", "displayName": "Connectivity", "state": "Enabled",
      "offerType": "MS-AZR-0017P", "tenantId": "t1" },
    { "id": "s2", "displayName": "Retired", "state": "Disabled",
      "offerType": "MS-AZR-0017P", "tenantId": "t1" }
  ]
}"#;

/// Get a Command for the mirror binary, isolated to `dir`
fn mirror_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mirror"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("HOME", dir.join("home"))
        .env_remove("MIRROR_SNAPSHOT")
        .env_remove("MIRROR_STATE")
        .env_remove("MIRROR_LOG");
    cmd
}

fn workspace(snapshot: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("tenant.json"), snapshot).unwrap();
    temp
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_output() {
    let temp = TempDir::new().unwrap();
    mirror_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tenant Mirror"))
        .stdout(predicate::str::contains("pull"));
}

#[test]
fn test_no_command_shows_help_hint() {
    let temp = TempDir::new().unwrap();
    mirror_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("mirror --help"));
}

// ============================================================================
// Pull
// ============================================================================

#[test]
fn test_pull_writes_state_tree() {
    let temp = workspace(SNAPSHOT);
    mirror_cmd(temp.path())
        .args(["pull", "--snapshot", "tenant.json", "--state", "state"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pulled tenant"))
        .stdout(predicate::str::contains("t1"));

    let state = temp.path().join("state");
    assert!(state
        .join("Tenant Root Group/.AzState/Microsoft.Management-managementGroups_t1.parameters.json")
        .is_file());
    assert!(state
        .join("Tenant Root Group/Platform/Connectivity/.AzState/Microsoft.Subscription-subscriptions_s1.parameters.json")
        .is_file());
    // Disabled subscriptions are excluded by default
    assert!(!state.join("Tenant Root Group/Platform/Retired").exists());
}

#[test]
fn test_second_pull_reports_up_to_date() {
    let temp = workspace(SNAPSHOT);
    let args = ["pull", "--snapshot", "tenant.json", "--state", "state"];
    mirror_cmd(temp.path()).args(args).assert().success();

    mirror_cmd(temp.path())
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));
}

#[test]
fn test_pull_json_report() {
    let temp = workspace(SNAPSHOT);
    let output = mirror_cmd(temp.path())
        .args(["pull", "--snapshot", "tenant.json", "--state", "state", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tenantId"], "t1");
    assert_eq!(report["scopes"], 3);
    assert_eq!(report["subscriptions"], 1);
    assert_eq!(report["reconcile"]["mode"], "incremental");
}

#[test]
fn test_pull_force_removes_user_files() {
    let temp = workspace(SNAPSHOT);
    let args = ["pull", "--snapshot", "tenant.json", "--state", "state"];
    mirror_cmd(temp.path()).args(args).assert().success();
    let user_file = temp.path().join("state/Tenant Root Group/notes.md");
    fs::write(&user_file, "mine").unwrap();

    mirror_cmd(temp.path()).args(args).arg("--rebuild").assert().success();
    assert!(user_file.exists());

    mirror_cmd(temp.path()).args(args).arg("--force").assert().success();
    assert!(!user_file.exists());
}

#[test]
fn test_pull_state_from_environment() {
    let temp = workspace(SNAPSHOT);
    mirror_cmd(temp.path())
        .env("MIRROR_STATE", "from-env")
        .args(["pull", "--snapshot", "tenant.json"])
        .assert()
        .success();
    assert!(temp.path().join("from-env/Tenant Root Group").is_dir());
}

#[test]
fn test_pull_rejects_multiple_tenants() {
    let snapshot = SNAPSHOT.replace(
        r#"[{ "tenantId": "t1", "principal": "spn-mirror" }]"#,
        r#"[{ "tenantId": "t1", "principal": "a" }, { "tenantId": "t2", "principal": "b" }]"#,
    );
    let temp = workspace(&snapshot);
    mirror_cmd(temp.path())
        .args(["pull", "--snapshot", "tenant.json", "--state", "state"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("t1, t2"));
    assert!(!temp.path().join("state").exists());
}

#[test]
fn test_pull_reports_denied_root_with_principal() {
    let snapshot = SNAPSHOT.replacen("{\n  \"contexts\"", "{\n  \"denied\": [\"t1\"],\n  \"contexts\"", 1);
    let temp = workspace(&snapshot);
    mirror_cmd(temp.path())
        .args(["pull", "--snapshot", "tenant.json", "--state", "state"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"))
        .stderr(predicate::str::contains("spn-mirror"));
}

#[test]
fn test_pull_missing_snapshot_fails() {
    let temp = TempDir::new().unwrap();
    mirror_cmd(temp.path())
        .args(["pull", "--snapshot", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Config and init
// ============================================================================

#[test]
fn test_config_prints_settings_json() {
    let temp = TempDir::new().unwrap();
    let output = mirror_cmd(temp.path())
        .env("MIRROR_THROTTLE_LIMIT", "3")
        .arg("config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["throttleLimit"], 3);
    assert_eq!(settings["subtreeFailurePolicy"], "abort");
}

#[test]
fn test_config_sources_names_the_layer() {
    let temp = TempDir::new().unwrap();
    mirror_cmd(temp.path())
        .env("MIRROR_SKIP_POLICY", "true")
        .args(["config", "--sources"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MIRROR_SKIP_POLICY"))
        .stdout(predicate::str::contains("environment"));
}

#[test]
fn test_config_rejects_invalid_value() {
    let temp = TempDir::new().unwrap();
    mirror_cmd(temp.path())
        .env("MIRROR_THROTTLE_LIMIT", "0")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MIRROR_THROTTLE_LIMIT"));
}

#[test]
fn test_init_writes_settings_file_once() {
    let temp = TempDir::new().unwrap();
    mirror_cmd(temp.path()).arg("init").assert().success();

    let content = fs::read_to_string(temp.path().join(".mirror/config.toml")).unwrap();
    assert!(content.contains("MIRROR_THROTTLE_LIMIT = 10"));

    mirror_cmd(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    mirror_cmd(temp.path()).args(["init", "--force"]).assert().success();

    // The written file resolves to the defaults
    mirror_cmd(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"throttleLimit\": 10"));
}
