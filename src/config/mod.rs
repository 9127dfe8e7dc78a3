pub mod ignore;
pub mod provenance;
pub mod resolve;
pub mod schema;
pub mod show;

use crate::metrics::ResultOption;
use crate::rules::ruleset::{RuleProperties, ALL};
use crate::rules::Priority;
use crate::walk::Language;
use provenance::ProvenanceMap;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Fully resolved configuration: every layer applied, no Option fields
/// except where "unset" is meaningful.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    // Operational
    pub lang: Option<Language>,
    pub format: String,
    pub quiet: bool,

    // Rule selection
    pub rulesets: String,
    pub min_priority: Priority,
    pub aggregation: ResultOption,

    // Targeting
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub ignore_patterns: Vec<String>,

    /// Per-rule property tables, keyed by rule name.
    pub rule_properties: BTreeMap<String, RuleProperties>,

    // Provenance
    pub provenance: ProvenanceMap,
    pub loaded_files: Vec<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            lang: None,
            format: "text".to_string(),
            quiet: false,
            rulesets: ALL.to_string(),
            min_priority: Priority::Low,
            aggregation: ResultOption::Sum,
            include: Vec::new(),
            exclude: Vec::new(),
            ignore_patterns: Vec::new(),
            rule_properties: BTreeMap::new(),
            provenance: ProvenanceMap::new(),
            loaded_files: Vec::new(),
        }
    }
}

impl ResolvedConfig {
    /// Exclude globs from configuration and `.tallyignore` together.
    pub fn all_excludes(&self) -> Vec<String> {
        self.exclude
            .iter()
            .chain(self.ignore_patterns.iter())
            .cloned()
            .collect()
    }
}
