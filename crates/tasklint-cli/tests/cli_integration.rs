use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn tasklint() -> Command {
    Command::cargo_bin("tasklint").unwrap()
}

/// Config with a single `sh -n` linter so runs do not depend on shellcheck.
fn sh_only_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join(".tasklint.toml");
    fs::write(
        &path,
        r#"
[[linters]]
pattern = "(/usr/bin/env |.*/bin/)sh"

[[linters.commands]]
command = "sh"
args = ["-n"]
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_valid_catalog_passes() {
    tasklint()
        .arg("tests/fixtures/valid")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_latest_image_fails() {
    tasklint()
        .arg("tests/fixtures/invalid")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("specific version"))
        .stdout(predicate::str::contains("invalid digest"));
}

#[test]
fn test_validate_subcommand() {
    tasklint()
        .arg("validate")
        .arg("tests/fixtures/invalid/task.yaml")
        .assert()
        .failure()
        .stdout(predicate::str::contains("floating-image"));
}

#[test]
fn test_warnings_pass_unless_strict() {
    tasklint()
        .arg("tests/fixtures/warnings")
        .assert()
        .success()
        .stdout(predicate::str::contains("fully qualified"))
        .stdout(predicate::str::contains("\"TOKEN\""));

    tasklint()
        .arg("tests/fixtures/warnings")
        .arg("--strict")
        .assert()
        .failure();
}

#[test]
fn test_verbose_shows_rule_ids() {
    tasklint()
        .arg("tests/fixtures/warnings")
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("TL-IMG-002"))
        .stdout(predicate::str::contains("TL-SEC-001"));
}

#[test]
fn test_format_json_output() {
    let output = tasklint()
        .arg("tests/fixtures/invalid")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["files_checked"], 1);
    assert_eq!(json["resources_checked"], 2);
    assert_eq!(json["summary"]["errors"], 2);
    assert_eq!(json["diagnostics"][0]["rule"], "TL-IMG-006");
    assert_eq!(json["diagnostics"][0]["file"], "task.yaml");
    assert_eq!(json["diagnostics"][1]["rule"], "TL-IMG-003");
    assert_eq!(json["diagnostics"][1]["kind"], "ClusterTask");
}

#[test]
fn test_format_text_is_default() {
    tasklint()
        .arg("tests/fixtures/valid")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\"").not());
}

#[test]
fn test_config_disables_rule() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join(".tasklint.toml");
    fs::write(
        &config,
        "[rules]\ndisabled_rules = [\"TL-IMG-006\", \"TL-IMG-003\"]\n",
    )
    .unwrap();

    tasklint()
        .arg("tests/fixtures/invalid")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn test_script_linter_failure_is_reported() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = sh_only_config(temp.path());

    tasklint()
        .arg("tests/fixtures/scripted")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[-n] failed:"))
        .stdout(predicate::str::contains("broken-script-run"));
}

#[test]
fn test_missing_linter_is_reported() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join(".tasklint.toml");
    fs::write(
        &config,
        r#"
[[linters]]
pattern = ".*"

[[linters.commands]]
command = "tasklint-missing-linter-7c1e"
"#,
    )
    .unwrap();

    tasklint()
        .arg("tests/fixtures/scripted")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Couldn't find the linter tasklint-missing-linter-7c1e in the path",
        ));
}

#[test]
fn test_init_writes_default_config() {
    let temp = tempfile::TempDir::new().unwrap();
    let output = temp.path().join("tasklint.toml");

    tasklint()
        .arg("init")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("linter_timeout_secs = 60"));
    assert!(content.contains("shellcheck"));
    assert!(content.contains("pylint"));
}

#[test]
fn test_rules_lists_catalog() {
    tasklint()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("TL-IMG-006"))
        .stdout(predicate::str::contains("TL-SCR-003"))
        .stdout(predicate::str::contains("17 rules"));
}

#[test]
fn test_invalid_exclude_is_fatal() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join(".tasklint.toml");
    fs::write(&config, "exclude = [\"[unclosed\"]\n").unwrap();

    tasklint()
        .arg("tests/fixtures/valid")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid exclude pattern"));
}

#[test]
fn test_help_mentions_format() {
    tasklint()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"));
}
