use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum TallyError {
    #[error("Ruleset not found: {identifier}")]
    #[diagnostic(
        code(tally::ruleset_not_found),
        help("Run `tally rules --rulesets all` to list the bundled rulesets")
    )]
    RuleSetNotFound { identifier: String },

    #[error("No rules found. Maybe you misspelled a rule name? ({rulesets})")]
    #[diagnostic(code(tally::no_rules))]
    NoRules { rulesets: String },

    #[error("No parseable files found in {path}")]
    #[diagnostic(code(tally::no_files))]
    NoFiles { path: PathBuf },

    #[error("Parse error in {file}: {message}")]
    #[diagnostic(code(tally::parse_error))]
    Parse { file: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(tally::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(tally::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(tally::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(tally::glob))]
    Glob(#[from] globset::Error),
}

impl TallyError {
    /// Whether this error is a fatal startup misconfiguration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TallyError::RuleSetNotFound { .. } | TallyError::NoRules { .. } | TallyError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
