//! Named rule collections and their resolution from identifier lists.

use crate::ast::AstNode;
use crate::errors::{Result, TallyError};
use crate::rules::complexity::{CyclomaticComplexityRule, NcssCountRule};
use crate::rules::design::{
    excessive_class_length, excessive_imports, excessive_method_count, excessive_parameter_list,
};
use crate::rules::{invalid_property, PropertyValue, Priority, Rule, RuleContext};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

pub const DESIGN: &str = "design";
pub const METRICS: &str = "metrics";
pub const ALL: &str = "all";

/// Bundled ruleset names, in listing order.
pub const BUNDLED: &[&str] = &[DESIGN, METRICS, ALL];

/// Property name, value pairs for one rule.
pub type RuleProperties = BTreeMap<String, PropertyValue>;

const ENABLED: &str = "enabled";
const PRIORITY: &str = "priority";

/// A named collection of configured rule instances.
#[derive(Debug)]
pub struct RuleSet {
    name: String,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref() as &dyn Rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Merged result of resolving several rulesets. Read-only once built.
#[derive(Debug, Default)]
pub struct RuleSets {
    sets: Vec<RuleSet>,
}

impl RuleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `set`, dropping rules already loaded from an earlier set.
    pub fn add(&mut self, set: RuleSet) {
        let loaded: HashSet<String> = self.all_rules().map(|r| r.name().to_string()).collect();
        let RuleSet { name, rules } = set;
        let rules = rules
            .into_iter()
            .filter(|r| {
                let duplicate = loaded.contains(r.name());
                if duplicate {
                    tracing::debug!("Skipping duplicate rule {} from {name}", r.name());
                }
                !duplicate
            })
            .collect();
        self.sets.push(RuleSet { name, rules });
    }

    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.sets
    }

    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(RuleSet::len).sum()
    }

    pub fn all_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.sets.iter().flat_map(|s| s.rules())
    }

    /// Run every rule over one tree.
    pub fn apply(&self, root: &AstNode, ctx: &mut RuleContext<'_>) {
        for rule in self.all_rules() {
            rule.apply(root, ctx);
        }
    }
}

/// Resolves a single ruleset identifier to a configured rule set.
pub trait RuleSetFactory {
    /// Fails with [`TallyError::RuleSetNotFound`] for unknown identifiers.
    fn create_rule_set(&self, identifier: &str) -> Result<RuleSet>;
}

/// Factory for the rulesets compiled into the binary.
///
/// Identifiers are a bundled name (`design`, `metrics`, `all`) or a single
/// rule reference `<ruleset>/<RuleName>`.
#[derive(Debug, Clone)]
pub struct BuiltinRuleSetFactory {
    min_priority: Priority,
    properties: BTreeMap<String, RuleProperties>,
}

impl Default for BuiltinRuleSetFactory {
    fn default() -> Self {
        Self::new(Priority::Low)
    }
}

impl BuiltinRuleSetFactory {
    pub fn new(min_priority: Priority) -> Self {
        Self {
            min_priority,
            properties: BTreeMap::new(),
        }
    }

    /// User-supplied properties, keyed by rule name, applied after the
    /// bundled defaults.
    pub fn with_properties(mut self, properties: BTreeMap<String, RuleProperties>) -> Self {
        self.properties = properties;
        self
    }

    pub fn min_priority(&self) -> Priority {
        self.min_priority
    }

    fn bundled(&self, name: &str) -> Option<Vec<Box<dyn Rule>>> {
        match name {
            DESIGN => Some(design_rules()),
            METRICS => Some(metric_rules()),
            ALL => {
                let mut rules = design_rules();
                rules.extend(metric_rules());
                Some(rules)
            }
            _ => None,
        }
    }

    /// Apply user properties and drop disabled rules.
    fn configure(&self, mut rule: Box<dyn Rule>) -> Result<Option<Box<dyn Rule>>> {
        let Some(properties) = self.properties.get(rule.name()) else {
            return Ok(Some(rule));
        };

        for (name, value) in properties {
            match name.as_str() {
                ENABLED => {
                    let enabled = value
                        .as_flag()
                        .ok_or_else(|| invalid_property(rule.name(), name, "a boolean"))?;
                    if !enabled {
                        tracing::debug!("Rule {} disabled by configuration", rule.name());
                        return Ok(None);
                    }
                }
                PRIORITY => {
                    let priority = value
                        .as_number()
                        .filter(|n| n.fract() == 0.0 && (1.0..=5.0).contains(n))
                        .map(|n| n as u8)
                        .and_then(Priority::from_level)
                        .ok_or_else(|| invalid_property(rule.name(), name, "a level from 1 to 5"))?;
                    rule.set_priority(priority);
                }
                _ => rule.set_property(name, value)?,
            }
        }
        Ok(Some(rule))
    }

    fn finish(&self, name: &str, rules: Vec<Box<dyn Rule>>) -> Result<RuleSet> {
        let mut kept = Vec::with_capacity(rules.len());
        for rule in rules {
            if let Some(rule) = self.configure(rule)? {
                if rule.priority() <= self.min_priority {
                    kept.push(rule);
                }
            }
        }
        Ok(RuleSet::new(name, kept))
    }
}

impl RuleSetFactory for BuiltinRuleSetFactory {
    fn create_rule_set(&self, identifier: &str) -> Result<RuleSet> {
        let not_found = || TallyError::RuleSetNotFound {
            identifier: identifier.to_string(),
        };

        match identifier.split_once('/') {
            Some((set, rule_name)) => {
                let rules = self.bundled(set).ok_or_else(not_found)?;
                let rule = rules
                    .into_iter()
                    .find(|r| r.name() == rule_name)
                    .ok_or_else(not_found)?;
                self.finish(identifier, vec![rule])
            }
            None => {
                let rules = self.bundled(identifier).ok_or_else(not_found)?;
                self.finish(identifier, rules)
            }
        }
    }
}

/// Counting rules with the thresholds the `design` ruleset ships with.
fn design_rules() -> Vec<Box<dyn Rule>> {
    let mut imports = excessive_imports();
    imports.set_minimum(30.0);
    let mut class_length = excessive_class_length();
    class_length.set_minimum(1000.0);
    let mut method_count = excessive_method_count();
    method_count.set_minimum(10.0);
    let parameter_list = excessive_parameter_list();

    vec![
        Box::new(imports),
        Box::new(class_length),
        Box::new(method_count),
        Box::new(parameter_list),
    ]
}

fn metric_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(CyclomaticComplexityRule::new()),
        Box::new(NcssCountRule::new()),
    ]
}

/// Resolve a comma-separated list of ruleset identifiers.
///
/// Any unresolvable identifier fails the whole call, and so does a list that
/// resolves to no rules at all.
pub fn get_rule_sets(identifiers: &str, factory: &dyn RuleSetFactory) -> Result<RuleSets> {
    let mut rule_sets = RuleSets::new();

    for identifier in identifiers.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let set = factory.create_rule_set(identifier).inspect_err(|e| {
            tracing::error!("{e}");
        })?;
        rule_sets.add(set);
    }

    for rule in rule_sets.all_rules() {
        tracing::debug!("Loaded rule {}", rule.name());
    }

    if rule_sets.rule_count() == 0 {
        let err = TallyError::NoRules {
            rulesets: identifiers.to_string(),
        };
        tracing::error!("{err}");
        return Err(err);
    }

    Ok(rule_sets)
}

/// [`get_rule_sets`], logging how long resolution took.
pub fn get_rule_sets_timed(identifiers: &str, factory: &dyn RuleSetFactory) -> Result<RuleSets> {
    let start = Instant::now();
    let result = get_rule_sets(identifiers, factory);
    tracing::debug!(
        "Loaded rulesets '{identifiers}' in {:.2?}",
        start.elapsed()
    );
    result
}
