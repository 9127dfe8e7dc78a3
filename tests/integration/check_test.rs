use crate::{fixture_path, tally};
use predicates::prelude::*;

#[test]
fn clean_project_passes_with_fail_on_violation() {
    tally()
        .args(["check", "--quiet", "--fail-on-violation"])
        .arg(fixture_path("java/clean"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("0 violations"));
}

#[test]
fn violations_exit_2_with_fail_on_violation() {
    tally()
        .args(["check", "--quiet", "--fail-on-violation", "--rulesets", "design"])
        .arg(fixture_path("java/violations"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("ExcessiveParameterList"));
}

#[test]
fn violations_exit_0_without_flag() {
    tally()
        .args(["check", "--quiet"])
        .arg(fixture_path("java/violations"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Avoid long parameter lists."));
}

#[test]
fn json_output_lists_violations() {
    let output = tally()
        .args(["check", "--quiet", "--format", "json", "--lang", "java"])
        .arg(fixture_path("java/violations"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["metadata"]["language"], "java");
    assert_eq!(json["metadata"]["files_parsed"], 1);
    assert_eq!(json["metadata"]["rule_count"], 6);

    let violations = json["violations"].as_array().unwrap();
    let params = violations
        .iter()
        .find(|v| v["rule"] == "ExcessiveParameterList")
        .expect("parameter list violation");
    assert_eq!(params["score"], "11");
    assert_eq!(params["priority"], 3);
    assert_eq!(params["file"], "src/orders/Orders.java");
}

#[test]
fn sarif_output_is_2_1_0() {
    let output = tally()
        .args(["check", "--quiet", "--format", "sarif", "--rulesets", "design"])
        .arg(fixture_path("java/violations"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let sarif: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
    let results = sarif["runs"][0]["results"].as_array().unwrap();
    assert!(results
        .iter()
        .any(|r| r["ruleId"] == "ExcessiveParameterList"));
}

#[test]
fn single_rule_reference() {
    tally()
        .args([
            "check",
            "--quiet",
            "--rulesets",
            "design/ExcessiveParameterList",
        ])
        .arg(fixture_path("java/violations"))
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 rules)"));
}

#[test]
fn unknown_ruleset_fails_before_parsing() {
    tally()
        .args(["check", "--quiet", "--rulesets", "design,nonexistent"])
        .arg(fixture_path("java/violations"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn min_priority_filters_every_rule() {
    // Built-in rules are all priority 3.
    tally()
        .args(["check", "--quiet", "--min-priority", "2"])
        .arg(fixture_path("java/violations"))
        .assert()
        .failure();
}

#[test]
fn python_parameter_list() {
    tally()
        .args(["check", "--quiet", "--lang", "python"])
        .arg(fixture_path("python/app"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ExcessiveParameterList"));
}

#[test]
fn bad_path_fails() {
    tally()
        .args(["check", "/nonexistent/path", "--lang", "go"])
        .assert()
        .failure();
}

#[test]
fn project_config_changes_thresholds() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("src/orders")).unwrap();
    std::fs::copy(
        fixture_path("java/violations/src/orders/Orders.java"),
        tmp.path().join("src/orders/Orders.java"),
    )
    .unwrap();
    std::fs::write(
        tmp.path().join(".tally.toml"),
        r#"
[rules.ExcessiveParameterList]
minimum = 20
"#,
    )
    .unwrap();

    tally()
        .args(["check", "--quiet", "--fail-on-violation", "--rulesets", "design"])
        .arg(tmp.path())
        .assert()
        .code(0);
}

#[test]
fn tallyignore_skips_files() {
    let tmp = tempfile::tempdir().unwrap();
    for dir in ["src/orders", "generated"] {
        std::fs::create_dir_all(tmp.path().join(dir)).unwrap();
    }
    std::fs::copy(
        fixture_path("java/clean/src/shop/Cart.java"),
        tmp.path().join("src/orders/Cart.java"),
    )
    .unwrap();
    std::fs::copy(
        fixture_path("java/violations/src/orders/Orders.java"),
        tmp.path().join("generated/Orders.java"),
    )
    .unwrap();
    std::fs::write(tmp.path().join(".tallyignore"), "generated/**\n").unwrap();

    tally()
        .args(["check", "--quiet", "--fail-on-violation"])
        .arg(tmp.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Parsed:     1 files"));
}
