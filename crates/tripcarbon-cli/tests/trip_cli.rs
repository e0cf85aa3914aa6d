//! Integration tests for the `tripcarbon` binary.
//!
//! Only modes that need no routing service (plane, ferry, sail) are computed,
//! and the HTTP endpoints point at a closed local port so that comparisons
//! fail fast instead of reaching the network.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const UNREACHABLE: &str = "http://127.0.0.1:9";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

fn tripcarbon() -> Command {
    let mut cmd = Command::cargo_bin("tripcarbon").expect("binary exists");
    cmd.env("NO_COLOR", "1")
        .env("TRIPCARBON_ROAD_URL", UNREACHABLE)
        .env("TRIPCARBON_RAIL_URL", UNREACHABLE)
        .env("TRIPCARBON_CYCLING_URL", UNREACHABLE)
        .env("TRIPCARBON_OVERPASS_URL", UNREACHABLE)
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(fixtures_dir());
    cmd
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("tripcarbon")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("trip"))
        .stdout(predicate::str::contains("layers"));
}

#[test]
fn layers_lists_fixture_regions() {
    tripcarbon()
        .arg("layers")
        .assert()
        .success()
        .stdout(predicate::str::contains("rail intensity (gCO2/pkm): 4 regions"))
        .stdout(predicate::str::contains("France"));
}

#[test]
fn plane_then_ferry_trip_as_json() {
    let output = tripcarbon()
        .args([
            "--quiet",
            "trip",
            "--step",
            "2.35,48.85",
            "--step",
            "plane@-6.3,53.35",
            "--step",
            "ferry:vehicle@-4.6,53.3",
            "--format",
            "json",
        ])
        .output()
        .expect("run tripcarbon");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).expect("json report");
    let trips = report["trips"].as_array().expect("trips array");
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0]["name"], "MAIN_TRIP");

    let steps = trips[0]["steps"].as_array().expect("steps");
    assert_eq!(steps[0]["transport_means"], "Plane");
    assert_eq!(steps[1]["transport_means"], "Ferry");
    assert_eq!(steps[0]["emissions"][1]["name"], "Contrails");
    assert_eq!(steps[1]["emissions"][0]["name"], "Ferry (Vehicle)");
    assert!(trips[0]["total_kg_co2_eq"].as_f64().expect("total") > 0.0);
}

#[test]
fn geojson_output_is_a_feature_collection() {
    let output = tripcarbon()
        .args([
            "--quiet",
            "trip",
            "--step",
            "-6.3,53.35",
            "--step",
            "sail@-4.6,53.3",
            "--no-compare",
            "--format",
            "geojson",
        ])
        .output()
        .expect("run tripcarbon");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let collection: Value = serde_json::from_slice(&output.stdout).expect("geojson");
    assert_eq!(collection["type"], "FeatureCollection");
    let feature = &collection["features"][0];
    assert_eq!(feature["geometry"]["type"], "MultiLineString");
    assert_eq!(feature["properties"]["transport_means"], "Sail");
}

#[test]
fn unreachable_services_are_left_out_of_the_comparison() {
    tripcarbon()
        .args([
            "--quiet",
            "trip",
            "--step",
            "-20,45",
            "--step",
            "sail@-15,45",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("MAIN_TRIP"))
        .stdout(predicate::str::contains("DIRECT_PLANE"))
        .stdout(predicate::str::contains("DIRECT_CAR").not())
        .stdout(predicate::str::contains("DIRECT_TRAIN").not());
}

#[test]
fn failing_leg_is_reported() {
    tripcarbon()
        .args([
            "--quiet",
            "trip",
            "--step",
            "2.35,48.85",
            "--step",
            "plane@-6.3,53.35",
            "--step",
            "car@-6.2,53.4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("leg 2 could not be computed by Car"));
}

#[test]
fn unknown_mode_is_rejected() {
    tripcarbon()
        .args(["trip", "--step", "2.35,48.85", "--step", "teleport@4.83,45.76"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown transport mode"));
}

#[test]
fn missing_reference_layers_fail_with_context() {
    let dir = tempfile::tempdir().expect("temp dir");
    Command::cargo_bin("tripcarbon")
        .expect("binary exists")
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(dir.path())
        .args(["trip", "--step", "2.35,48.85", "--step", "plane@-6.3,53.35"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load reference layers"));
}
