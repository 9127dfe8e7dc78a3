use crate::tally;
use predicates::prelude::*;

#[test]
fn config_show_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    tally()
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved settings:"))
        .stdout(predicate::str::contains("defaults.format: text <- default"))
        .stdout(predicate::str::contains("defaults.rulesets: all <- default"));
}

#[test]
fn config_show_with_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".tally.toml"),
        r#"
[defaults]
format = "json"
rulesets = "design"

[rules.NcssCount]
minimum = 45
"#,
    )
    .unwrap();

    tally()
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(".tally.toml"))
        .stdout(predicate::str::contains("defaults.format: json <- project config"))
        .stdout(predicate::str::contains("defaults.rulesets: design <- project config"))
        .stdout(predicate::str::contains("rules.NcssCount.minimum: 45 <- project config"));
}

#[test]
fn config_show_env_override() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".tally.toml"),
        "[defaults]\nformat = \"json\"\n",
    )
    .unwrap();

    tally()
        .env("TALLY_FORMAT", "sarif")
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("defaults.format: sarif <- env var (TALLY_FORMAT)"));
}

#[test]
fn config_explain_rule() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".tally.toml"),
        "[rules.CyclomaticComplexity]\nminimum = 15\nenabled = true\n",
    )
    .unwrap();

    tally()
        .args([
            "config",
            "explain",
            "CyclomaticComplexity",
            "--path",
            tmp.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule: CyclomaticComplexity"))
        .stdout(predicate::str::contains("rules.CyclomaticComplexity.minimum: 15"));
}

#[test]
fn config_explain_unconfigured_rule() {
    let tmp = tempfile::tempdir().unwrap();
    tally()
        .args(["config", "explain", "NcssCount", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults apply"));
}

#[test]
fn malformed_project_config_fails() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(".tally.toml"), "[defaults\nformat = ").unwrap();

    tally()
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project config"));
}

#[test]
fn config_explain_unknown_rule_fails() {
    let tmp = tempfile::tempdir().unwrap();
    tally()
        .args(["config", "explain", "NcssCounts", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule"));
}
