use crate::config::resolve::{resolve_config, CliOverrides};
use crate::errors::{Result, TallyError};
use crate::rules::{get_rule_sets, BuiltinRuleSetFactory};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show resolved configuration with provenance
    Show {
        /// Working directory (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Explain where a rule's configured properties come from
    Explain {
        /// Rule name (e.g., NcssCount, ExcessiveImports)
        rule: String,
        /// Working directory (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    let path = match &args.action {
        ConfigAction::Show { path } | ConfigAction::Explain { path, .. } => path,
    };
    let working_dir = resolve_working_dir(path)?;
    let config = resolve_config(&working_dir, &CliOverrides::default())?;

    let mut stdout = std::io::stdout();
    match &args.action {
        ConfigAction::Show { .. } => crate::config::show::render_show(&mut stdout, &config)?,
        ConfigAction::Explain { rule, .. } => {
            ensure_known_rule(rule)?;
            crate::config::show::render_explain(&mut stdout, &config, rule)?;
        }
    }
    Ok(())
}

/// Explaining a misspelled rule would silently report built-in defaults.
fn ensure_known_rule(rule: &str) -> Result<()> {
    let bundled = get_rule_sets("all", &BuiltinRuleSetFactory::default())?;
    if bundled.all_rules().any(|r| r.name() == rule) {
        Ok(())
    } else {
        Err(TallyError::Config(format!("Unknown rule '{rule}'")))
    }
}

pub(crate) fn resolve_working_dir(path: &Option<PathBuf>) -> Result<PathBuf> {
    let p = path.clone().unwrap_or_else(|| PathBuf::from("."));
    p.canonicalize()
        .map_err(|_| TallyError::Config(format!("Invalid path: {}", p.display())))
}
