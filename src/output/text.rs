use crate::errors::Result;
use crate::output::json::{Metadata, MetricValues, MetricsMetadata, OperationMetrics, TypeMetrics};
use crate::report::Report;
use std::io::Write;

/// Write check output as human-readable text, grouped by file.
pub fn write_check_text<W: Write>(
    writer: &mut W,
    report: &Report,
    metadata: &Metadata,
) -> Result<()> {
    writeln!(writer, "Tally Report")?;
    writeln!(writer, "============")?;
    writeln!(writer)?;
    writeln!(writer, "Language:   {}", metadata.language)?;
    writeln!(writer, "Root:       {}", metadata.root.display())?;
    writeln!(
        writer,
        "Rulesets:   {} ({} rules)",
        metadata.rulesets.join(", "),
        metadata.rule_count
    )?;
    writeln!(writer, "Parsed:     {} files", metadata.files_parsed)?;
    writeln!(writer, "Skipped:    {} files", metadata.files_skipped)?;
    writeln!(writer)?;

    let groups = report.by_file();
    for (file, violations) in &groups {
        let heading = file.display().to_string();
        writeln!(writer, "{heading}")?;
        writeln!(writer, "{:-<1$}", "", heading.len())?;
        for v in violations {
            writeln!(
                writer,
                "  {:>5}-{:<5} {:<24} [P{}] {}",
                v.begin_line, v.end_line, v.rule, v.priority, v.message
            )?;
        }
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "{} violations in {} files. Completed in {:.2}s ({:.0} files/sec)",
        report.len(),
        groups.len(),
        metadata.elapsed_ms as f64 / 1000.0,
        metadata.files_per_second
    )?;

    Ok(())
}

fn format_values(values: &MetricValues) -> String {
    values
        .iter()
        .map(|(name, value)| {
            if value.is_nan() {
                format!("{name}=-")
            } else if value.fract() == 0.0 {
                format!("{name}={value:.0}")
            } else {
                format!("{name}={value:.2}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn write_operation<W: Write>(writer: &mut W, op: &OperationMetrics, indent: &str) -> Result<()> {
    writeln!(
        writer,
        "{indent}{} (lines {}-{})",
        op.name, op.begin_line, op.end_line
    )?;
    writeln!(writer, "{indent}    {}", format_values(&op.metrics))?;
    Ok(())
}

/// Write metrics output as human-readable text.
pub fn write_metrics_text<W: Write>(
    writer: &mut W,
    metadata: &MetricsMetadata,
    types: &[TypeMetrics],
    functions: &[OperationMetrics],
) -> Result<()> {
    writeln!(writer, "Tally Metrics")?;
    writeln!(writer, "=============")?;
    writeln!(writer)?;
    writeln!(writer, "Language:    {}", metadata.language)?;
    writeln!(writer, "Root:        {}", metadata.root.display())?;
    writeln!(writer, "Aggregation: {}", metadata.aggregation)?;
    writeln!(writer, "Parsed:      {} files", metadata.files_parsed)?;
    writeln!(writer)?;

    if !types.is_empty() {
        writeln!(writer, "Types")?;
        writeln!(writer, "{:-<60}", "")?;
        for ty in types {
            writeln!(
                writer,
                "{} ({}:{}-{})",
                ty.name,
                ty.file.display(),
                ty.begin_line,
                ty.end_line
            )?;
            writeln!(writer, "    {}", format_values(&ty.metrics))?;
            for op in &ty.operations {
                write_operation(writer, op, "  ")?;
            }
            writeln!(writer)?;
        }
    }

    if !functions.is_empty() {
        writeln!(writer, "Functions")?;
        writeln!(writer, "{:-<60}", "")?;
        for op in functions {
            write_operation(writer, op, "")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}
