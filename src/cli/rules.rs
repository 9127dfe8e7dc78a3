use crate::cli::config::resolve_working_dir;
use crate::cli::parse_priority;
use crate::config::resolve::{resolve_config, CliOverrides};
use crate::errors::Result;
use crate::rules::ruleset::get_rule_sets_timed;
use crate::rules::{BuiltinRuleSetFactory, Priority, RuleSets};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Comma-separated rulesets or `<ruleset>/<Rule>` references
    #[arg(long)]
    pub rulesets: Option<String>,

    /// Drop rules less important than this priority (1 = high, 5 = low)
    #[arg(long, value_parser = parse_priority)]
    pub min_priority: Option<Priority>,

    /// Working directory (defaults to current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

pub fn run(args: &RulesArgs) -> Result<()> {
    let working_dir = resolve_working_dir(&args.path)?;
    let overrides = CliOverrides {
        rulesets: args.rulesets.clone(),
        min_priority: args.min_priority,
        ..Default::default()
    };
    let config = resolve_config(&working_dir, &overrides)?;

    let factory = BuiltinRuleSetFactory::new(config.min_priority)
        .with_properties(config.rule_properties.clone());
    let rule_sets = get_rule_sets_timed(&config.rulesets, &factory)?;

    let mut stdout = std::io::stdout().lock();
    write_rules(&mut stdout, &rule_sets)?;
    Ok(())
}

/// One line per rule, grouped under the ruleset that contributed it.
pub(crate) fn write_rules<W: Write>(w: &mut W, rule_sets: &RuleSets) -> std::io::Result<()> {
    for set in rule_sets.rule_sets() {
        if set.is_empty() {
            continue;
        }
        writeln!(w, "{}", set.name())?;
        for rule in set.rules() {
            writeln!(w, "  {:<24} P{}  {}", rule.name(), rule.priority(), rule.message())?;
        }
    }
    writeln!(w)?;
    writeln!(w, "{} rules", rule_sets.rule_count())?;
    Ok(())
}
