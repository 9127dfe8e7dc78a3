use crate::errors::Result;
use crate::report::{Report, Violation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    pub metadata: &'a Metadata,
    pub violations: &'a [Violation],
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub language: String,
    pub root: PathBuf,
    pub rulesets: Vec<String>,
    pub rule_count: usize,
    pub files_parsed: usize,
    pub files_skipped: usize,
    pub violation_count: usize,
    pub timestamp: String,
    pub elapsed_ms: u64,
    pub files_per_second: f64,
}

/// Write check output as JSON.
pub fn write_check_json<W: Write>(
    writer: &mut W,
    report: &Report,
    metadata: &Metadata,
) -> Result<()> {
    let output = CheckOutput {
        metadata,
        violations: report.violations(),
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

/// Metric values keyed by metric name. NaN serializes as `null`.
pub type MetricValues = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize)]
pub struct OperationMetrics {
    pub name: String,
    pub file: PathBuf,
    pub begin_line: usize,
    pub end_line: usize,
    pub metrics: MetricValues,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeMetrics {
    pub name: String,
    pub file: PathBuf,
    pub begin_line: usize,
    pub end_line: usize,
    pub metrics: MetricValues,
    pub operations: Vec<OperationMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsMetadata {
    pub language: String,
    pub root: PathBuf,
    pub aggregation: String,
    pub files_parsed: usize,
    pub files_skipped: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct MetricsOutput<'a> {
    pub metadata: &'a MetricsMetadata,
    pub types: &'a [TypeMetrics],
    /// Operations declared outside any type.
    pub functions: &'a [OperationMetrics],
}

/// Write metrics output as JSON.
pub fn write_metrics_json<W: Write>(
    writer: &mut W,
    metadata: &MetricsMetadata,
    types: &[TypeMetrics],
    functions: &[OperationMetrics],
) -> Result<()> {
    let output = MetricsOutput {
        metadata,
        types,
        functions,
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}
