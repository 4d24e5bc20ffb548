use std::collections::HashMap;

use diagnostics_tk::observer::{FeedSnapshot, ResultFeed};
use diagnostics_tk::output::{ConsoleTable, JsonOutput};
use diagnostics_tk::{
    ensure, Attributes, DiagnosticResult, FailureKind, ProbeMethod, ProbeOutcome, Runner,
    TestCollection,
};

/// Resolver probes against a fixed host table, so the run is deterministic.
struct Dns {
    hostname: String,
    hosts: HashMap<String, String>,
}

impl Dns {
    fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            hosts: HashMap::from([("localhost".to_string(), "127.0.0.1".to_string())]),
        }
    }

    fn test_resolve(&self) -> ProbeOutcome {
        ensure(self.hosts.contains_key(&self.hostname), "timeout")
    }

    fn test_loopback(&self) -> ProbeOutcome {
        let address = self.hosts.get("localhost").map(String::as_str);
        ensure(address == Some("127.0.0.1"), "loopback missing")
    }

    fn helper(&self) -> ProbeOutcome {
        panic!("helpers are never run")
    }
}

impl TestCollection for Dns {
    fn probes(&self) -> Vec<ProbeMethod<Self>> {
        vec![
            ProbeMethod::new("test_resolve", "Can {hostname} resolve?", Self::test_resolve),
            ProbeMethod::new("test_loopback", "Loopback is configured", Self::test_loopback),
            ProbeMethod::new("helper", "Not a probe", Self::helper),
        ]
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([("hostname".to_string(), self.hostname.clone())])
    }
}

#[test]
fn resolver_run_reports_pass_and_fail() {
    let working = Dns::new("localhost");
    let broken = Dns::new("nowhere.invalid");
    let feed = ResultFeed::default();
    let mut table = ConsoleTable::with_writer(Vec::new());
    let mut json = JsonOutput::new(Vec::new());

    let report = {
        let mut runner = Runner::new("net", 2).unwrap();
        runner.register("local", &working).unwrap();
        runner.register("remote", &broken).unwrap();
        runner.register("table", &mut table).unwrap();
        runner.register("json", &mut json).unwrap();
        runner.add_observer(&feed).unwrap();
        runner.run().unwrap()
    };

    let names: Vec<&str> = report.results.iter().map(|r| r.qualified_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "net::Dns(local)::test_loopback",
            "net::Dns(local)::test_resolve",
            "net::Dns(remote)::test_loopback",
            "net::Dns(remote)::test_resolve",
        ]
    );
    assert_eq!(report.passed(), 3);
    assert_eq!(report.failed(), 1);
    assert!(!report.all_passed());
    assert!(report.sink_failures.is_empty());

    let failed = &report.results[3];
    assert_eq!(failed.description, "Can nowhere.invalid resolve?");
    assert_eq!(failed.reason, "timeout");
    assert_eq!(failed.failure, Some(FailureKind::Assertion));
    assert_eq!(report.results[1].reason, "n/a");

    assert_eq!(
        feed.snapshot(),
        FeedSnapshot {
            total: 4,
            passed: 3,
            failed: 1
        }
    );

    let rendered = String::from_utf8(table.into_writer()).unwrap();
    assert!(rendered.contains("Diagnostic results."));
    assert!(rendered.contains("| Can localhost resolve?"));
    assert!(rendered.contains("FAILED"));

    let exported: Vec<DiagnosticResult> = serde_json::from_slice(&json.into_writer()).unwrap();
    assert_eq!(exported, report.results);
}

#[test]
fn plan_matches_what_run_executes() {
    let dns = Dns::new("localhost");
    let mut runner = Runner::new("net", 1).unwrap().without_log_observer();
    runner.register_collection("dns", &dns).unwrap();

    let planned: Vec<String> = runner
        .plan()
        .unwrap()
        .into_iter()
        .map(|info| info.qualified_name)
        .collect();
    let report = runner.run().unwrap();
    let executed: Vec<String> = report
        .results
        .into_iter()
        .map(|result| result.qualified_name)
        .collect();

    assert_eq!(planned, executed);
    assert!(report.sink_failures.is_empty());
}

#[cfg(unix)]
#[test]
fn configured_command_checks_run_end_to_end() {
    use diagnostics_tk::RunnerConfig;

    let config = RunnerConfig::from_json(
        r#"{
            "name": "ops",
            "workers": 3,
            "collections": [{
                "name": "shell",
                "attributes": { "shell": "sh" },
                "checks": [
                    { "name": "true", "description": "{shell} runs true", "command": "true",
                      "exit_code": 0 },
                    { "name": "false", "description": "{shell} runs false", "command": "false",
                      "exit_code": 0 },
                    { "name": "echo", "description": "{shell} echoes", "command": "echo ready",
                      "stdout_pattern": "^ready$" }
                ]
            }]
        }"#,
    )
    .unwrap();
    let collections = config.build_collections().unwrap();

    let report = {
        let mut runner = Runner::new(config.name.as_str(), config.workers).unwrap();
        for (name, collection) in &collections {
            runner.register_collection(name.as_str(), collection).unwrap();
        }
        runner.run().unwrap()
    };

    let outcomes: Vec<(&str, bool, &str)> = report
        .results
        .iter()
        .map(|r| (r.qualified_name.as_str(), r.passed, r.reason.as_str()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("ops::CommandChecks(shell)::test_echo", true, "n/a"),
            (
                "ops::CommandChecks(shell)::test_false",
                false,
                "Exit code is '1' instead of the expected '0'."
            ),
            ("ops::CommandChecks(shell)::test_true", true, "n/a"),
        ]
    );
    assert_eq!(report.results[1].description, "sh runs false");
}
