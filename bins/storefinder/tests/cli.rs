//! End-to-end runs of the storefinder binary, always offline

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

fn storefinder() -> Command {
    let mut cmd = Command::cargo_bin("storefinder").unwrap();
    cmd.env_remove("STOREFINDER_MAPS_API_KEY")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help() {
    storefinder()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("distance"))
        .stdout(predicate::str::contains("navigate"));
}

#[test]
fn test_distance_text() {
    storefinder()
        .args(["distance", "12.9716", "77.5946", "12.9352", "77.6245"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" km ("));
}

#[test]
fn test_distance_json_with_estimated_route() {
    let output = storefinder()
        .args(["-f", "json", "distance", "--route", "--offline"])
        .args(["12.9716", "77.5946", "12.9352", "77.6245"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    let km = json["distance_km"].as_f64().unwrap();
    assert!((5.0..5.5).contains(&km), "got {km}");
    assert_eq!(json["route"]["estimated"], true);
}

#[test]
fn test_distance_handles_negative_coordinates() {
    storefinder()
        .args(["distance", "-33.8688", "151.2093", "-37.8136", "144.9631"])
        .assert()
        .success();
}

#[test]
fn test_validate_normalises() {
    storefinder()
        .args(["validate", "12.97159999", "77.59460001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12.9716"));
}

#[test]
fn test_validate_out_of_range_is_validation_error() {
    storefinder()
        .args(["validate", "91", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("91"));
}

#[test]
fn test_validate_json_failure_report() {
    let output = storefinder()
        .args(["-f", "json", "validate", "0", "181"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json_stdout(&output)["ok"], false);
}

#[test]
fn test_geocode_offline_uses_gazetteer() {
    storefinder()
        .args(["geocode", "--offline", "Koramangala"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12.9352"))
        .stdout(predicate::str::contains("77.6245"));
}

#[test]
fn test_geocode_json_reports_stats() {
    let output = storefinder()
        .args(["-f", "json", "geocode", "--offline", "Indiranagar", "Indiranagar"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["online"], false);
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
}

#[test]
fn test_stores_filters_and_sorts_by_distance() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("stores.json");
    let rows = serde_json::json!([
        { "name": "Far Mart", "address": "Whitefield", "lat": 12.9698, "lng": 77.7500, "hours": "9am - 9pm" },
        { "name": "Near Mart", "address": "MG Road", "lat": 12.9756, "lng": 77.6066, "hours": "open 24 hours", "rating": 4.4 },
        { "name": "Corner Shop", "address": "Koramangala", "lat": 12.9352, "lng": 77.6245 },
        { "address": "no name here" }
    ]);
    fs::write(&file, rows.to_string()).unwrap();

    let output = storefinder()
        .current_dir(dir.path())
        .arg("stores")
        .arg(&file)
        .args(["--lat", "12.9716", "--lng", "77.5946", "--max-km", "10", "--offline", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = json_stdout(&output);
    assert_eq!(json["total"], 3);
    assert_eq!(json["ingest"]["skipped"], 1);

    let names: Vec<&str> = json["stores"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    // Whitefield is ~16 km out
    assert_eq!(names, vec!["Near Mart", "Corner Shop"]);
}

#[test]
fn test_stores_hours_filter() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("stores.json");
    let rows = serde_json::json!([
        { "name": "Day Shop", "location": "MG Road", "lat": 12.9756, "lng": 77.6066, "hours": "9am - 6pm" },
        { "name": "All Night", "location": "MG Road", "lat": 12.9756, "lng": 77.6066, "hours": "Open 24 hours" }
    ]);
    fs::write(&file, rows.to_string()).unwrap();

    storefinder()
        .current_dir(dir.path())
        .arg("stores")
        .arg(&file)
        .args(["--hours", "24h", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All Night"))
        .stdout(predicate::str::contains("Day Shop").not());
}

#[test]
fn test_stores_missing_file_fails() {
    storefinder()
        .args(["stores", "/definitely/not/here.json", "--offline"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load stores"));
}

#[test]
fn test_navigate_iphone_link_order() {
    storefinder()
        .args(["navigate", "--from", "12.9716,77.5946", "--to", "12.9352,77.6245"])
        .args(["--name", "Corner Shop", "--touch-points", "5", "--user-agent", IPHONE])
        .assert()
        .success()
        .stdout(predicate::str::contains("google_maps_ios"))
        .stdout(predicate::str::contains("apple_maps"))
        .stdout(predicate::str::contains("web"));
}

#[test]
fn test_navigate_host_message() {
    let output = storefinder()
        .args(["navigate", "--host", "--from", "12.9716,77.5946", "--to", "12.9352,77.6245"])
        .args(["--user-agent", IPHONE, "--touch-points", "5"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["kind"], "navigate");
    assert_eq!(json["strategy"], "google_maps_ios");
    assert_eq!(json["fallback_urls"].as_array().unwrap().len(), 2);
}

#[test]
fn test_navigate_invalid_destination() {
    storefinder()
        .args(["navigate", "--from", "12.9716,77.5946", "--to", "95,77.6245"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_config_file_is_config_error() {
    storefinder()
        .args(["--config", "/definitely/not/storefinder.toml", "validate", "1", "2"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not/storefinder.toml"));
}

#[test]
fn test_missing_config_file_json_report() {
    let output = storefinder()
        .args(["-f", "json", "--config", "/definitely/not/storefinder.toml", "validate", "1", "2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let json = json_stdout(&output);
    assert_eq!(json["code_str"], "E3001");
    assert_eq!(json["category"], "Configuration");
}
