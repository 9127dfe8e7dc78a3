use crate::ast::{AstNode, NodeKind};
use crate::cli::{discover_sources, parse_and_visit, parse_language};
use crate::config::resolve::{resolve_config, CliOverrides};
use crate::errors::{Result, TallyError};
use crate::metrics::{
    DeclarationComputer, MetricMemoizer, MetricOptions, MetricsComputer, OperationMetric,
    ParameterizedMetricKey, ProjectMemoizer, ResultOption, TypeMetric,
};
use crate::output::json::{MetricValues, MetricsMetadata, OperationMetrics, TypeMetrics};
use crate::output::{timestamp_now, OutputFormat};
use crate::walk::Language;
use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Path to analyze
    pub path: PathBuf,

    /// Language to analyze
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// How operation CYCLO values roll up to their type
    #[arg(long, value_parser = ["sum", "highest", "average"])]
    pub aggregation: Option<String>,

    /// Output format (text or json)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Include glob patterns
    #[arg(long)]
    pub include: Vec<String>,

    /// Exclude glob patterns
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}

impl MetricsArgs {
    fn to_cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            lang: self.lang,
            format: self.format,
            quiet: self.quiet,
            aggregation: self.aggregation.as_deref().map(ResultOption::parse),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            ..Default::default()
        }
    }
}

pub fn run(args: &MetricsArgs) -> Result<()> {
    // Project config is looked up from the analyzed tree.
    let working_dir = args.path.canonicalize().map_err(|_| TallyError::NoFiles {
        path: args.path.clone(),
    })?;
    let config = resolve_config(&working_dir, &args.to_cli_overrides())?;
    let format: OutputFormat = config.format.parse().map_err(TallyError::Config)?;
    if format == OutputFormat::Sarif {
        return Err(TallyError::Config(
            "metrics output supports text and json only".to_string(),
        ));
    }

    let sources = discover_sources(&args.path, &config)?;
    let computer = DeclarationComputer;
    let aggregation = config.aggregation;

    let (per_file, files_skipped) = parse_and_visit(&sources, config.quiet, |parsed| {
        let mut memoizer = ProjectMemoizer::new();
        collect_metrics(&parsed.relative, &parsed.root, aggregation, &computer, &mut memoizer)
    });
    ParameterizedMetricKey::clear_registry();

    let files_parsed = per_file.len();
    let mut types = Vec::new();
    let mut functions = Vec::new();
    for (file_types, file_functions) in per_file {
        types.extend(file_types);
        functions.extend(file_functions);
    }

    let metadata = MetricsMetadata {
        language: sources.lang.to_string(),
        root: sources.root.clone(),
        aggregation: aggregation.to_string(),
        files_parsed,
        files_skipped,
        timestamp: timestamp_now(),
    };

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Json => {
            crate::output::json::write_metrics_json(&mut stdout, &metadata, &types, &functions)?
        }
        _ => crate::output::text::write_metrics_text(&mut stdout, &metadata, &types, &functions)?,
    }
    stdout.flush()?;
    Ok(())
}

fn operation_metrics(
    file: &Path,
    op: &AstNode,
    computer: &dyn MetricsComputer,
    project: &mut ProjectMemoizer,
) -> OperationMetrics {
    let options = MetricOptions::empty();
    let mut scratch = MetricMemoizer::new();
    let memo = match op.qualified_name() {
        Some(name) => project.operation_memoizer(name),
        None => &mut scratch,
    };

    let mut metrics = MetricValues::new();
    for metric in OperationMetric::ALL {
        let key = metric.key();
        if key.supports(op) {
            let value = computer.compute_for_operation(key, op, false, &options, memo);
            metrics.insert(metric.name().to_string(), value);
        }
    }

    OperationMetrics {
        name: display_name(op),
        file: file.to_path_buf(),
        begin_line: op.begin_line(),
        end_line: op.end_line(),
        metrics,
    }
}

fn display_name(node: &AstNode) -> String {
    node.qualified_name()
        .map(|q| q.to_string())
        .or_else(|| node.name().map(str::to_string))
        .unwrap_or_else(|| format!("<anonymous@{}>", node.begin_line()))
}

/// Metric values for every type in one file, plus the operations declared
/// outside any type.
pub(crate) fn collect_metrics(
    file: &Path,
    root: &AstNode,
    aggregation: ResultOption,
    computer: &dyn MetricsComputer,
    project: &mut ProjectMemoizer,
) -> (Vec<TypeMetrics>, Vec<OperationMetrics>) {
    let options = MetricOptions::empty();
    let mut types = Vec::new();

    for ty in root.find_descendants_of_kind(NodeKind::TypeDeclaration) {
        let mut metrics = MetricValues::new();
        for metric in TypeMetric::ALL {
            let key = metric.key();
            if !key.supports(ty) {
                continue;
            }
            let value = match ty.qualified_name() {
                Some(name) => {
                    let memo = project.type_memoizer(name);
                    computer.compute_for_type(key, ty, false, &options, memo)
                }
                None => {
                    let mut scratch = MetricMemoizer::new();
                    computer.compute_for_type(key, ty, false, &options, &mut scratch)
                }
            };
            metrics.insert(metric.name().to_string(), value);
        }

        let cyclo = OperationMetric::Cyclo;
        let rolled_up = computer.compute_with_result_option(
            cyclo.key(),
            ty,
            false,
            &options,
            aggregation,
            project,
        );
        metrics.insert(cyclo.name().to_string(), rolled_up);

        let operations = computer
            .find_operations(ty)
            .into_iter()
            .map(|op| operation_metrics(file, op, computer, project))
            .collect();

        types.push(TypeMetrics {
            name: display_name(ty),
            file: file.to_path_buf(),
            begin_line: ty.begin_line(),
            end_line: ty.end_line(),
            metrics,
            operations,
        });
    }

    let functions = root
        .descendants_within(NodeKind::TypeDeclaration)
        .filter(|n| n.kind() == NodeKind::OperationDeclaration)
        .map(|op| operation_metrics(file, op, computer, project))
        .collect();

    (types, functions)
}
