use crate::cli::{discover_sources, parse_and_visit, parse_language, parse_priority};
use crate::config::resolve::{resolve_config, CliOverrides};
use crate::errors::{Result, TallyError};
use crate::metrics::{DeclarationComputer, ParameterizedMetricKey, ProjectMemoizer};
use crate::output::json::Metadata;
use crate::output::{timestamp_now, OutputFormat};
use crate::report::Report;
use crate::rules::ruleset::get_rule_sets_timed;
use crate::rules::{BuiltinRuleSetFactory, Priority, RuleContext};
use crate::walk::Language;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Exit status when `--fail-on-violation` is set and violations were found.
pub const VIOLATIONS_EXIT_CODE: i32 = 2;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to analyze
    pub path: PathBuf,

    /// Comma-separated rulesets or `<ruleset>/<Rule>` references
    #[arg(long)]
    pub rulesets: Option<String>,

    /// Language to analyze
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Drop rules less important than this priority (1 = high, 5 = low)
    #[arg(long, value_parser = parse_priority)]
    pub min_priority: Option<Priority>,

    /// Include glob patterns
    #[arg(long)]
    pub include: Vec<String>,

    /// Exclude glob patterns
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,

    /// Exit with status 2 when any violation is reported
    #[arg(long)]
    pub fail_on_violation: bool,
}

impl CheckArgs {
    fn to_cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            lang: self.lang,
            format: self.format,
            quiet: self.quiet,
            rulesets: self.rulesets.clone(),
            min_priority: self.min_priority,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            ..Default::default()
        }
    }
}

pub fn run(args: &CheckArgs) -> Result<()> {
    let start = Instant::now();

    // Project config is looked up from the analyzed tree.
    let working_dir = args.path.canonicalize().map_err(|_| TallyError::NoFiles {
        path: args.path.clone(),
    })?;
    let config = resolve_config(&working_dir, &args.to_cli_overrides())?;
    let format: OutputFormat = config.format.parse().map_err(TallyError::Config)?;

    // Configuration problems fail before any file is read.
    let factory = BuiltinRuleSetFactory::new(config.min_priority)
        .with_properties(config.rule_properties.clone());
    let rule_sets = get_rule_sets_timed(&config.rulesets, &factory)?;

    let sources = discover_sources(&args.path, &config)?;
    let computer = DeclarationComputer;

    let (reports, files_skipped) = parse_and_visit(&sources, config.quiet, |parsed| {
        let mut report = Report::for_file(parsed.relative);
        let mut memoizer = ProjectMemoizer::new();
        let file = report.file().to_path_buf();
        let mut ctx = RuleContext::new(&file, &mut report, &mut memoizer, &computer);
        rule_sets.apply(&parsed.root, &mut ctx);
        report
    });

    // Interned keys are only shared within a run.
    ParameterizedMetricKey::clear_registry();

    let files_parsed = reports.len();
    let mut report = Report::default();
    for file_report in reports {
        report.merge(file_report);
    }
    report.sort();

    let elapsed_ms = start.elapsed().as_millis() as u64;
    let files_per_second = if elapsed_ms > 0 {
        files_parsed as f64 / (elapsed_ms as f64 / 1000.0)
    } else {
        0.0
    };

    let metadata = Metadata {
        language: sources.lang.to_string(),
        root: sources.root.clone(),
        rulesets: rule_sets
            .rule_sets()
            .iter()
            .map(|s| s.name().to_string())
            .collect(),
        rule_count: rule_sets.rule_count(),
        files_parsed,
        files_skipped,
        violation_count: report.len(),
        timestamp: timestamp_now(),
        elapsed_ms,
        files_per_second: (files_per_second * 10.0).round() / 10.0,
    };

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => {
            crate::output::text::write_check_text(&mut stdout, &report, &metadata)?;
        }
        OutputFormat::Json => {
            crate::output::json::write_check_json(&mut stdout, &report, &metadata)?;
        }
        OutputFormat::Sarif => {
            crate::output::sarif::write_sarif(&mut stdout, &report, &rule_sets)?;
        }
    }
    stdout.flush()?;

    if !config.quiet && format != OutputFormat::Text {
        eprintln!(
            "Checked {} files with {} rules: {} violations in {:.2}s",
            files_parsed,
            rule_sets.rule_count(),
            report.len(),
            elapsed_ms as f64 / 1000.0
        );
    }

    if args.fail_on_violation && !report.is_empty() {
        std::process::exit(VIOLATIONS_EXIT_CODE);
    }

    Ok(())
}
