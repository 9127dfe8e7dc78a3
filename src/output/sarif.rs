use crate::errors::Result;
use crate::report::Report;
use crate::rules::{Priority, RuleSets};
use serde::Serialize;
use std::io::Write;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    default_configuration: SarifConfiguration,
}

#[derive(Debug, Serialize)]
struct SarifConfiguration {
    level: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    rule_index: usize,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
    end_line: usize,
}

fn level(priority: Priority) -> &'static str {
    match priority {
        Priority::High | Priority::MediumHigh => "error",
        Priority::Medium => "warning",
        Priority::MediumLow | Priority::Low => "note",
    }
}

/// Write check output as SARIF 2.1.0, one rule entry per resolved rule.
pub fn write_sarif<W: Write>(writer: &mut W, report: &Report, rule_sets: &RuleSets) -> Result<()> {
    let rules: Vec<SarifRule> = rule_sets
        .all_rules()
        .map(|rule| SarifRule {
            id: rule.name().to_string(),
            name: rule.name().to_string(),
            short_description: SarifMessage {
                text: rule.message().to_string(),
            },
            default_configuration: SarifConfiguration {
                level: level(rule.priority()),
            },
        })
        .collect();

    let results = report
        .violations()
        .iter()
        .map(|v| SarifResult {
            rule_index: rules.iter().position(|r| r.id == v.rule).unwrap_or_default(),
            rule_id: v.rule.clone(),
            level: level(v.priority),
            message: SarifMessage {
                text: v.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: v.file.to_string_lossy().replace('\\', "/"),
                    },
                    region: SarifRegion {
                        start_line: v.begin_line,
                        end_line: v.end_line,
                    },
                },
            }],
        })
        .collect();

    let log = SarifLog {
        schema: SARIF_SCHEMA.to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "tally".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    };

    serde_json::to_writer_pretty(&mut *writer, &log)?;
    writeln!(writer)?;
    Ok(())
}
