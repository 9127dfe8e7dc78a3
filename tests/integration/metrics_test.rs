use crate::{fixture_path, tally};
use predicates::prelude::*;

fn metrics_json(fixture: &str, extra: &[&str]) -> serde_json::Value {
    let output = tally()
        .args(["metrics", "--quiet", "--format", "json"])
        .args(extra)
        .arg(fixture_path(fixture))
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn java_type_metrics() {
    let json = metrics_json("java/clean", &[]);
    assert_eq!(json["metadata"]["aggregation"], "sum");

    let types = json["types"].as_array().unwrap();
    assert_eq!(types.len(), 1);
    let cart = &types[0];
    assert_eq!(cart["name"], "shop.Cart");
    assert_eq!(cart["metrics"]["NOM"], 2.0);
    // add: 1, total: 1 + for + if + && = 4
    assert_eq!(cart["metrics"]["WMC"], 5.0);
    assert_eq!(cart["metrics"]["CYCLO"], 5.0);
    assert_eq!(cart["operations"].as_array().unwrap().len(), 2);
}

#[test]
fn aggregation_flag_changes_type_cyclo() {
    let json = metrics_json("java/clean", &["--aggregation", "highest"]);
    assert_eq!(json["metadata"]["aggregation"], "highest");
    assert_eq!(json["types"][0]["metrics"]["CYCLO"], 4.0);
}

#[test]
fn python_module_functions_are_listed() {
    let json = metrics_json("python/app", &[]);
    let functions = json["functions"].as_array().unwrap();
    let issue = functions
        .iter()
        .find(|f| f["name"].as_str().unwrap().contains("issue"))
        .expect("module-level function");
    assert_eq!(issue["metrics"]["PARAMS"], 11.0);
}

#[test]
fn go_test_files_are_excluded() {
    let json = metrics_json("go/svc", &["--lang", "go"]);
    assert_eq!(json["metadata"]["files_parsed"], 1);
}

#[test]
fn rust_free_functions_and_types() {
    tally()
        .args(["metrics", "--quiet"])
        .arg(fixture_path("rust/inventory"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Language:    rust"))
        .stdout(predicate::str::contains("restock"));
}

#[test]
fn sarif_is_rejected() {
    tally()
        .args(["metrics", "--quiet", "--format", "sarif"])
        .arg(fixture_path("java/clean"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("text and json only"));
}

#[test]
fn unknown_aggregation_is_a_usage_error() {
    tally()
        .args(["metrics", "--aggregation", "median"])
        .arg(fixture_path("java/clean"))
        .assert()
        .failure();
}
