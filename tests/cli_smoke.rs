use predicates::str::contains;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn write_temp(name: &str, contents: &str, extension: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be available")
        .as_nanos();
    path.push(format!("dispatch-{}-{}.{}", name, nanos, extension));
    fs::write(&path, contents).expect("sample write should succeed");
    path
}

fn write_samples() -> (PathBuf, PathBuf, PathBuf) {
    let arrivals = write_temp("gaps", "0.8\n1.4\n2.9\n1.1\n3.6\n0.5\n2.2\n1.7\n", "csv");
    let triage = write_temp("triage", "1.2\n2.1\n3.4\n1.8\n2.6\n", "csv");
    let service = write_temp("service", "14.0\n22.5\n31.0\n18.2\n26.4\n12.7\n", "csv");
    (arrivals, triage, service)
}

#[test]
fn summary_run_reports_each_scenario() {
    let (arrivals, triage, service) = write_samples();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dispatch-sim");
    cmd.args([
        "run",
        "--units",
        "1,2",
        "--calls",
        "6",
        "--seed",
        "42",
        "--format",
        "summary",
        "--arrivals",
        arrivals.to_str().unwrap(),
        "--triage",
        triage.to_str().unwrap(),
        "--service",
        service.to_str().unwrap(),
    ]);
    cmd.assert()
        .success()
        .stdout(contains("Metadata:\n"))
        .stdout(contains("calls: 6\n"))
        .stdout(contains("scenarios: 2\n"))
        .stdout(contains("1 unit: "))
        .stdout(contains("2 units: "));
}

#[test]
fn json_run_reports_every_call() {
    let (arrivals, triage, service) = write_samples();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dispatch-sim");
    cmd.args([
        "run",
        "--units",
        "2",
        "--calls",
        "5",
        "--seed",
        "3",
        "--format",
        "json",
        "--arrivals",
        arrivals.to_str().unwrap(),
        "--triage",
        triage.to_str().unwrap(),
        "--service",
        service.to_str().unwrap(),
    ]);
    let output = cmd.output().expect("command should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(value[0]["capacity"], 2);
    assert_eq!(value[0]["total_calls"], 5);
    assert_eq!(value[0]["outcomes"].as_array().map(|a| a.len()), Some(5));
}

#[test]
fn same_seed_reproduces_the_report() {
    let (arrivals, triage, service) = write_samples();
    let args = [
        "run".to_string(),
        "--units".to_string(),
        "1,3".to_string(),
        "--calls".to_string(),
        "8".to_string(),
        "--seed".to_string(),
        "11".to_string(),
        "--arrivals".to_string(),
        arrivals.to_str().unwrap().to_string(),
        "--triage".to_string(),
        triage.to_str().unwrap().to_string(),
        "--service".to_string(),
        service.to_str().unwrap().to_string(),
    ];

    let mut first = assert_cmd::cargo::cargo_bin_cmd!("dispatch-sim");
    first.args(&args);
    let first = first.output().expect("command should run");
    assert!(first.status.success());

    let mut second = assert_cmd::cargo::cargo_bin_cmd!("dispatch-sim");
    second.args(&args);
    let second = second.output().expect("command should run");
    assert!(second.status.success());

    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn fit_reports_a_family_per_sample() {
    let (arrivals, _, service) = write_samples();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dispatch-sim");
    cmd.args([
        "fit",
        arrivals.to_str().unwrap(),
        service.to_str().unwrap(),
    ]);
    cmd.assert()
        .success()
        .stdout(contains("ks "))
        .stdout(contains(": "));
}
