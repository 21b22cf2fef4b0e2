use assert_cmd::Command;
use grid_outbreak::report::DailyReportRow;
use grid_outbreak::runner::format_summary;
use grid_outbreak::{run, DiseasePreset, RunResult, SimulationConfig};
use tempfile::tempdir;

fn grid_outbreak() -> Command {
    Command::cargo_bin("grid-outbreak").unwrap()
}

#[test]
fn prints_summary_for_defaults() {
    let expected = run(&SimulationConfig::default()).unwrap();
    grid_outbreak()
        .assert()
        .success()
        .stdout(format_summary(&expected.summary));
}

#[test]
fn seed_and_disease_overrides() {
    let config = SimulationConfig {
        seed: "cli-seed".to_string(),
        disease: DiseasePreset::Covid.profile(),
        ..SimulationConfig::default()
    };
    let expected = run(&config).unwrap();
    grid_outbreak()
        .args(["--seed", "cli-seed", "--disease", "COVID"])
        .assert()
        .success()
        .stdout(format_summary(&expected.summary));
}

#[test]
fn writes_reports() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.json");
    let config = SimulationConfig {
        simulation_length: 20,
        seed: "reports".to_string(),
        mask_level: 30,
        ..SimulationConfig::default()
    };
    std::fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();
    let output_dir = temp_dir.path().join("out");

    grid_outbreak()
        .arg("--config")
        .arg(&config_path)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success();

    let mut reader = csv::Reader::from_path(output_dir.join("daily.csv")).unwrap();
    let rows: Vec<DailyReportRow> = reader.deserialize().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].day, 1);

    let text = std::fs::read_to_string(output_dir.join("run.json")).unwrap();
    let result: RunResult = serde_json::from_str(&text).unwrap();
    assert_eq!(result.days.len(), 20);
    assert_eq!(result.summary.peak_prevalence, run(&config).unwrap().summary.peak_prevalence);
}

#[test]
fn logging_goes_to_stderr() {
    let output = grid_outbreak()
        .args(["--log-level", "info"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("starting run"));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("peak prevalence:"));
}

#[test]
fn bad_config_fails() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.json");
    std::fs::write(&config_path, "{\"seed\": \"incomplete\"}").unwrap();
    let output = grid_outbreak()
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid configuration"));
}
