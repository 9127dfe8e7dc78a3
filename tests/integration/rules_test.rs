use crate::tally;
use predicates::prelude::*;

#[test]
fn lists_all_bundled_rules() {
    tally()
        .args(["rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ExcessiveImports"))
        .stdout(predicate::str::contains("CyclomaticComplexity"))
        .stdout(predicate::str::contains("6 rules"));
}

#[test]
fn single_ruleset() {
    tally()
        .args(["rules", "--rulesets", "metrics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NcssCount"))
        .stdout(predicate::str::contains("ExcessiveImports").not())
        .stdout(predicate::str::contains("2 rules"));
}

#[test]
fn rulesets_from_environment() {
    tally()
        .env("TALLY_RULESETS", "design")
        .args(["rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 rules"));
}

#[test]
fn unknown_rule_reference_fails() {
    tally()
        .args(["rules", "--rulesets", "design/NoSuchRule"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("design/NoSuchRule"));
}
