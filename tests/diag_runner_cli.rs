#![cfg(unix)]

use std::io::Write;
use std::process::Command;

use serde_json::Value;
use tempfile::NamedTempFile;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_diag-runner"))
}

fn config_file(checks: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    write!(
        file,
        r#"{{
            "name": "cli",
            "workers": 2,
            "title": "CLI checks",
            "collections": [{{ "name": "shell", "attributes": {{ "who": "sh" }},
                               "checks": [{checks}] }}]
        }}"#
    )
    .expect("write config");
    file
}

const PASSING: &str = r#"{ "name": "ok", "description": "{who} exits 0", "command": "true",
                           "exit_code": 0 }"#;
const FAILING: &str = r#"{ "name": "bad", "description": "{who} exits 1", "command": "false",
                           "exit_code": 0 }"#;

#[test]
fn all_passing_run_exits_zero_and_prints_table() {
    let config = config_file(PASSING);
    let output = cli()
        .args(["run", "--config"])
        .arg(config.path())
        .output()
        .expect("run command");

    assert!(
        output.status.success(),
        "run exited with {:?}",
        output.status.code()
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(stdout.contains("CLI checks"), "missing title in {stdout}");
    assert!(stdout.contains("cli::CommandChecks(shell)::test_ok"));
    assert!(stdout.contains("| OK "));
}

#[test]
fn failing_probe_exits_two() {
    let config = config_file(&format!("{PASSING}, {FAILING}"));
    let output = cli()
        .args(["run", "--format", "json", "--workers", "1", "--config"])
        .arg(config.path())
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(2));
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON payload");
    let results = json.as_array().expect("result array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["qualified_name"], "cli::CommandChecks(shell)::test_bad");
    assert_eq!(results[0]["passed"], false);
    assert_eq!(
        results[0]["reason"],
        "Exit code is '1' instead of the expected '0'."
    );
    assert_eq!(results[1]["passed"], true);
}

#[test]
fn json_output_is_written_to_file() {
    let config = config_file(PASSING);
    let dir = tempfile::tempdir().expect("temp dir");
    let destination = dir.path().join("results.json");

    let output = cli()
        .args(["run", "--format", "json", "--config"])
        .arg(config.path())
        .arg("--output")
        .arg(&destination)
        .output()
        .expect("run command");

    assert!(output.status.success());
    let data = std::fs::read_to_string(&destination).expect("results written to disk");
    let json: Value = serde_json::from_str(&data).expect("valid JSON payload");
    assert_eq!(json[0]["description"], "sh exits 0");
}

#[test]
fn list_prints_probes_without_running_them() {
    let marker_dir = tempfile::tempdir().expect("temp dir");
    let marker = marker_dir.path().join("ran");
    let touching = format!(
        r#"{{ "name": "touch", "description": "Touches a file",
              "command": "touch {}" }}"#,
        marker.display()
    );
    let config = config_file(&format!("{PASSING}, {touching}"));

    let output = cli()
        .args(["list", "--config"])
        .arg(config.path())
        .output()
        .expect("list command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "cli::CommandChecks(shell)::test_ok - sh exits 0",
            "cli::CommandChecks(shell)::test_touch - Touches a file",
        ]
    );
    assert!(!marker.exists());
}

#[test]
fn bad_configuration_exits_one() {
    let mut config = NamedTempFile::new().expect("temp config");
    config.write_all(b"{\"workers\": 0}").expect("write config");

    let output = cli()
        .args(["run", "--config"])
        .arg(config.path())
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr utf8");
    assert!(stderr.contains("diag-runner error"), "unexpected stderr: {stderr}");
}
