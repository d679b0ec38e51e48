use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "emberloot-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn arena_catalog() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../emberloot-sim/tests/fixtures/arena.json")
}

fn json_run(label: &str, extra: &[&str]) -> serde_json::Value {
    let exe = env!("CARGO_BIN_EXE_emberloot-tester");
    let output_path = temp_path(label);
    let status = Command::new(exe)
        .args(["--report", "json", "--output"])
        .arg(&output_path)
        .args(extra)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    let _ = std::fs::remove_file(output_path);
    serde_json::from_str(&content).expect("json report")
}

#[test]
fn cli_list_writes_nodes() {
    let exe = env!("CARGO_BIN_EXE_emberloot-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available nodes"));
    assert!(content.contains("Charred Road"));
}

#[test]
fn cli_json_report_for_seeded_batch() {
    let report = json_run(
        "json",
        &["--node", "1-2", "--level", "5", "--iterations", "8", "--seed", "7"],
    );
    assert_eq!(report["nodeId"], "1-2");
    assert_eq!(report["iterations"], 8);
    assert_eq!(report["actualRuns"], 8);
    assert!(report["waveStats"].as_array().is_some_and(|waves| !waves.is_empty()));
}

#[test]
fn cli_seeded_runs_are_reproducible() {
    let args = [
        "--chapter", "ch2", "--node", "2-1", "--level", "15", "--iterations", "12", "--seed",
        "99", "--variance", "10", "--elite-chance", "20",
    ];
    assert_eq!(json_run("repeat-a", &args), json_run("repeat-b", &args));
}

#[test]
fn cli_markdown_report_has_wave_table() {
    let exe = env!("CARGO_BIN_EXE_emberloot-tester");
    let output_path = temp_path("markdown");
    let status = Command::new(exe)
        .args([
            "--iterations",
            "3",
            "--seed",
            "1",
            "--report",
            "markdown",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("# Emberloot Simulation: ch1 1-1"));
    assert!(content.contains("## Waves"));
}

#[test]
fn cli_unknown_node_fails() {
    let exe = env!("CARGO_BIN_EXE_emberloot-tester");
    let output = Command::new(exe)
        .args(["--node", "9-9", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("node '9-9' not found"));
}

#[test]
fn cli_custom_catalog_is_used() {
    let catalog = arena_catalog();
    let catalog = catalog.to_str().expect("utf-8 path");
    let report = json_run(
        "catalog",
        &["--catalog", catalog, "--chapter", "arena", "--node", "gauntlet", "--iterations", "4"],
    );
    assert_eq!(report["chapterName"], "Testing Arena");
    assert_eq!(report["waveStats"].as_array().map(Vec::len), Some(2));

    let exe = env!("CARGO_BIN_EXE_emberloot-tester");
    let output = Command::new(exe)
        .args(["--catalog", catalog, "--chapter", "arena", "--node", "hollow"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no valid runs"));
}
