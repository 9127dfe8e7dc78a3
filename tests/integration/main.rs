mod check_test;
mod config_test;
mod metrics_test;
mod rules_test;

use assert_cmd::Command;
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// `tally` with configuration environment variables cleared.
pub fn tally() -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env_remove("TALLY_RULESETS")
        .env_remove("TALLY_FORMAT")
        .env_remove("TALLY_MIN_PRIORITY");
    cmd
}
