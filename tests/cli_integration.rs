mod common;

use std::fs;

use assert_cmd::Command;
use budget_plot::budget::SAMPLE_BUDGET_YAML;
use common::{temp_dir, write_definition};
use predicates::str::contains;

fn budget_plot() -> Command {
    let mut cmd = Command::cargo_bin("budget_plot").unwrap();
    cmd.env("BUDGET_PLOT_HOME", temp_dir()).env("NO_COLOR", "1");
    cmd
}

#[test]
fn init_writes_sample_and_refuses_overwrite() {
    let dir = temp_dir();
    let path = dir.join("budget.yaml");

    budget_plot()
        .arg("init")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Created"));
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE_BUDGET_YAML);

    budget_plot()
        .arg("init")
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("Error: Invalid file"));

    budget_plot()
        .args(["init", "--force"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn plot_writes_requested_reports() {
    let dir = temp_dir();
    let definition = write_definition(&dir, "plan.yaml", SAMPLE_BUDGET_YAML);

    budget_plot()
        .arg("plot")
        .arg(&definition)
        .args(["--csv", "--sheet", "--svg"])
        .assert()
        .success()
        .stdout(contains("plan.csv"))
        .stdout(contains("plan.svg"));

    let csv = fs::read_to_string(dir.join("plan.csv")).unwrap();
    assert!(csv.ends_with("2022-01-05,0,-5,0,-5,172\n"));
    let sheet = fs::read_to_string(dir.join("plan.sheet.csv")).unwrap();
    assert!(sheet.contains("=SUM(B2:D2)"));
    let svg = fs::read_to_string(dir.join("plan.svg")).unwrap();
    assert!(svg.contains("Cumulative Total"));
}

#[test]
fn show_prints_truncated_table() {
    let dir = temp_dir();
    let definition = write_definition(&dir, "plan.yaml", SAMPLE_BUDGET_YAML);

    budget_plot()
        .arg("show")
        .arg(&definition)
        .args(["--max-rows", "2", "--no-color"])
        .assert()
        .success()
        .stdout(contains("cumulative_total"))
        .stdout(contains("..."))
        .stdout(contains("172"));
}

#[test]
fn plot_uses_explicit_config() {
    let dir = temp_dir();
    let definition = write_definition(&dir, "plan.yaml", SAMPLE_BUDGET_YAML);
    let config = write_definition(&dir, "report.json", r#"{ "delimiter": ";" }"#);

    budget_plot()
        .arg("plot")
        .arg(&definition)
        .arg("-c")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    let csv = fs::read_to_string(dir.join("plan.csv")).unwrap();
    assert!(csv.starts_with("date;cash;food;commute"));
}

#[test]
fn unresolvable_frequency_exits_with_error() {
    let dir = temp_dir();
    let definition = write_definition(
        &dir,
        "bad.yaml",
        "PERIOD: {start: '2022-01-01', end: '2022-01-02'}\nITEMS:\n  rent: {amount: 1, frequency: sometimes}\n",
    );

    budget_plot()
        .arg("show")
        .arg(&definition)
        .assert()
        .code(1)
        .stderr(contains("Error: Frequency `sometimes`"));
}

#[test]
fn version_reports_build_metadata() {
    budget_plot()
        .arg("version")
        .assert()
        .success()
        .stdout(contains("budget_plot 0.1.0"))
        .stdout(contains("rustc:"));
}
