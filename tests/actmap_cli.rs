use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value as JSValue;
use tempfile::TempDir;

const PEOPLE: &str = "Community roster,,,
First Name,Last Name,Address,Focus Neighbourhood
Jane,Doe,1 Main St,Downtown
John,Smith,9 Nowhere Ln,Uptown
Ana,Lee,1 Main St,Downtown
";

const ACTIVITIES: &str = "Activity Type,Activity Name,Facilitators
Study Circle,Book 1,Jane Doe; Ana Lee
Devotional,Prayers,
Junior Youth Group,JY Group,John Smith
Book Club,Books,Jane Doe
";

const TABLE: &str = "query,lat,lng
\"1 Main St, Downtown\",45.5,-75.5
";

fn fixtures() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("people.csv"), PEOPLE).unwrap();
    fs::write(dir.path().join("activities.csv"), ACTIVITIES).unwrap();
    fs::write(dir.path().join("table.csv"), TABLE).unwrap();
    dir
}

fn path_str(dir: &Path, name: &str) -> String {
    dir.join(name).display().to_string()
}

fn actmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_actmap"))
}

fn read_json(path: &str) -> JSValue {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn check_summary(js: &JSValue) {
    let individuals = js["individuals"].as_array().unwrap();
    assert_eq!(individuals.len(), 2);
    assert_eq!(individuals[0]["name"], "Jane Doe");
    assert_eq!(individuals[1]["name"], "Ana Lee");
    assert_eq!(individuals[0]["lat"], 45.5);

    let markers = js["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 2);
    for m in markers {
        assert_eq!(m["activityType"], "SC");
        assert_eq!(m["activityName"], "Book 1");
        // A single activity sits east of the home.
        assert_eq!(m["lat"], 45.5);
        let lng = m["lng"].as_f64().unwrap();
        assert!((lng - (-75.5 + 0.0005)).abs() < 1e-9);
    }

    assert_eq!(
        js["typeCounts"],
        serde_json::json!({"CC": 0, "DM": 0, "JY": 0, "SC": 1})
    );
    assert_eq!(
        js["neighbourhoods"],
        serde_json::json!([{"name": "Downtown", "individuals": 2}])
    );
    assert_eq!(js["noFacilitators"][0]["activityName"], "Prayers");
    assert_eq!(js["facilitatorNotFound"][0]["activityName"], "JY Group");
    assert_eq!(js["facilitatorNotFound"].as_array().unwrap().len(), 1);
    assert_eq!(js["failedAddresses"]["count"], 1);
    assert_eq!(
        js["failedAddresses"]["message"],
        "1 address could not be geocoded"
    );
}

#[test]
fn maps_from_command_line_flags() {
    let dir = fixtures();
    let out = path_str(dir.path(), "out.json");
    let status = actmap()
        .args([
            "--individuals",
            &path_str(dir.path(), "people.csv"),
            "--activities",
            &path_str(dir.path(), "activities.csv"),
            "--geocoder-table",
            &path_str(dir.path(), "table.csv"),
            "--out",
            &out,
        ])
        .status()
        .unwrap();
    assert!(status.success());
    check_summary(&read_json(&out));
}

#[test]
fn maps_from_a_config_file() {
    let dir = fixtures();
    let config = r#"{
        "individualsFile": "people.csv",
        "activitiesFile": "activities.csv",
        "geocoder": { "provider": "table", "tablePath": "table.csv" },
        "retry": { "maxRetries": 0, "backoffMillis": 0 },
        "outputFile": "summary.json"
    }"#;
    fs::write(dir.path().join("config.json"), config).unwrap();
    let status = actmap()
        .args(["--config", &path_str(dir.path(), "config.json")])
        .status()
        .unwrap();
    assert!(status.success());
    check_summary(&read_json(&path_str(dir.path(), "summary.json")));
}

#[test]
fn summary_goes_to_stdout_and_matches_itself() {
    let dir = fixtures();
    let args = [
        "--individuals".to_string(),
        path_str(dir.path(), "people.csv"),
        "--activities".to_string(),
        path_str(dir.path(), "activities.csv"),
        "--geocoder-table".to_string(),
        path_str(dir.path(), "table.csv"),
    ];
    let output = actmap().args(&args).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let js: JSValue = serde_json::from_str(&stdout).unwrap();
    check_summary(&js);

    let reference = path_str(dir.path(), "reference.json");
    fs::write(&reference, &stdout).unwrap();
    let status = actmap()
        .args(&args)
        .args(["--reference", &reference])
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn empty_out_means_stdout() {
    let dir = fixtures();
    let output = actmap()
        .current_dir(dir.path())
        .args([
            "--individuals",
            &path_str(dir.path(), "people.csv"),
            "--activities",
            &path_str(dir.path(), "activities.csv"),
            "--geocoder-table",
            &path_str(dir.path(), "table.csv"),
            "--out",
            "",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let js: JSValue = serde_json::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    check_summary(&js);
}

#[test]
fn reference_mismatch_fails() {
    let dir = fixtures();
    let reference = path_str(dir.path(), "reference.json");
    fs::write(&reference, "{\"markers\": []}").unwrap();
    let status = actmap()
        .args([
            "--individuals",
            &path_str(dir.path(), "people.csv"),
            "--geocoder-table",
            &path_str(dir.path(), "table.csv"),
            "--out",
            &path_str(dir.path(), "out.json"),
            "--reference",
            &reference,
        ])
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn individuals_only() {
    let dir = fixtures();
    let out = path_str(dir.path(), "out.json");
    let status = actmap()
        .args([
            "--individuals",
            &path_str(dir.path(), "people.csv"),
            "--geocoder-table",
            &path_str(dir.path(), "table.csv"),
            "--out",
            &out,
        ])
        .status()
        .unwrap();
    assert!(status.success());
    let js = read_json(&out);
    assert_eq!(js["individuals"].as_array().unwrap().len(), 2);
    assert!(js["markers"].as_array().unwrap().is_empty());
    assert_eq!(js["typeCounts"]["SC"], 0);
}

#[test]
fn missing_inputs_are_errors() {
    let dir = fixtures();
    // No geocoder.
    let status = actmap()
        .args(["--individuals", &path_str(dir.path(), "people.csv")])
        .status()
        .unwrap();
    assert!(!status.success());

    // No individuals file.
    let status = actmap()
        .args(["--geocoder-table", &path_str(dir.path(), "table.csv")])
        .status()
        .unwrap();
    assert!(!status.success());

    // Unsupported file type.
    fs::write(dir.path().join("people.ods"), "").unwrap();
    let status = actmap()
        .args([
            "--individuals",
            &path_str(dir.path(), "people.ods"),
            "--geocoder-table",
            &path_str(dir.path(), "table.csv"),
        ])
        .status()
        .unwrap();
    assert!(!status.success());
}
