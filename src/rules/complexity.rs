//! Rules that report declarations whose metric values exceed a threshold.

use crate::ast::query::is_test_declaration;
use crate::ast::{AstNode, NodeKind};
use crate::errors::Result;
use crate::metrics::{
    MetricKey, MetricMemoizer, MetricOptions, MetricTarget, OperationMetric, ResultOption,
    TypeMetric,
};
use crate::rules::{
    format_message, invalid_property, number_property, unknown_property, PropertyValue,
    Priority, Rule, RuleContext, MINIMUM_DESCRIPTOR,
};

pub const CYCLOMATIC_COMPLEXITY: &str = "CyclomaticComplexity";
pub const NCSS_COUNT: &str = "NcssCount";

const CLASS_MINIMUM: &str = "class_minimum";
const OPTIONS: &str = "options";
const SKIP_TESTS: &str = "skip_tests";
const AGGREGATION: &str = "aggregation";

/// Properties shared by every metric rule.
#[derive(Debug, Clone)]
struct Thresholds {
    name: &'static str,
    message: &'static str,
    priority: Priority,
    minimum: f64,
    class_minimum: f64,
    options: MetricOptions,
    skip_tests: bool,
}

impl Thresholds {
    fn new(name: &'static str, message: &'static str, minimum: f64, class_minimum: f64) -> Self {
        Self {
            name,
            message,
            priority: Priority::Medium,
            minimum,
            class_minimum,
            options: MetricOptions::empty(),
            skip_tests: false,
        }
    }

    /// Returns `Ok(false)` when `property` is not one of the shared ones.
    fn set(&mut self, property: &str, value: &PropertyValue) -> Result<bool> {
        match property {
            MINIMUM_DESCRIPTOR => self.minimum = number_property(self.name, property, value)?,
            CLASS_MINIMUM => self.class_minimum = number_property(self.name, property, value)?,
            SKIP_TESTS => {
                self.skip_tests = value
                    .as_flag()
                    .ok_or_else(|| invalid_property(self.name, property, "a boolean"))?
            }
            OPTIONS => match value {
                PropertyValue::List(items) => self.options = MetricOptions::of(items.iter().cloned()),
                PropertyValue::Text(item) => self.options = MetricOptions::of([item.clone()]),
                _ => return Err(invalid_property(self.name, property, "a list of option names")),
            },
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn skips(&self, node: &AstNode) -> bool {
        self.skip_tests && is_test_declaration(node)
    }

    fn report(
        &self,
        rule: &dyn Rule,
        ctx: &mut RuleContext<'_>,
        node: &AstNode,
        target: MetricTarget,
        value: f64,
    ) {
        let score = score_label(value);
        let target = target.to_string();
        let message = format_message(
            self.message,
            &[target.as_str(), display_name(node), score.as_str()],
        );
        ctx.add_violation(rule, node, &score, &message);
    }
}

fn display_name(node: &AstNode) -> &str {
    node.name()
        .or_else(|| node.qualified_name().map(|q| q.as_str()))
        .unwrap_or("<anonymous>")
}

/// Integral values print without a fraction; anything else keeps two places.
fn score_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value}")
    } else {
        format!("{value:.2}")
    }
}

/// Memoized operation metric, keyed by the operation's qualified name.
fn operation_value(
    ctx: &mut RuleContext<'_>,
    key: &MetricKey,
    op: &AstNode,
    options: &MetricOptions,
) -> f64 {
    let computer = ctx.computer();
    match op.qualified_name() {
        Some(name) => {
            let memo = ctx.memoizer().operation_memoizer(name);
            computer.compute_for_operation(key, op, false, options, memo)
        }
        None => {
            computer.compute_for_operation(key, op, false, options, &mut MetricMemoizer::new())
        }
    }
}

/// Memoized type metric, keyed by the type's qualified name.
fn type_value(
    ctx: &mut RuleContext<'_>,
    key: &MetricKey,
    ty: &AstNode,
    options: &MetricOptions,
) -> f64 {
    let computer = ctx.computer();
    match ty.qualified_name() {
        Some(name) => {
            let memo = ctx.memoizer().type_memoizer(name);
            computer.compute_for_type(key, ty, false, options, memo)
        }
        None => computer.compute_for_type(key, ty, false, options, &mut MetricMemoizer::new()),
    }
}

/// Flags complex operations and types whose aggregated operation complexity
/// is too high.
#[derive(Debug, Clone)]
pub struct CyclomaticComplexityRule {
    thresholds: Thresholds,
    aggregation: ResultOption,
}

impl CyclomaticComplexityRule {
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::new(
                CYCLOMATIC_COMPLEXITY,
                "The {0} '{1}' has a cyclomatic complexity of {2}.",
                10.0,
                80.0,
            ),
            aggregation: ResultOption::Sum,
        }
    }

    pub fn aggregation(&self) -> ResultOption {
        self.aggregation
    }
}

impl Default for CyclomaticComplexityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CyclomaticComplexityRule {
    fn name(&self) -> &str {
        self.thresholds.name
    }

    fn message(&self) -> &str {
        self.thresholds.message
    }

    fn priority(&self) -> Priority {
        self.thresholds.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.thresholds.priority = priority;
    }

    fn set_property(&mut self, name: &str, value: &PropertyValue) -> Result<()> {
        if name == AGGREGATION {
            return match value {
                PropertyValue::Text(mode) => {
                    self.aggregation = ResultOption::parse(mode);
                    Ok(())
                }
                _ => Err(invalid_property(self.thresholds.name, name, "a string")),
            };
        }
        if self.thresholds.set(name, value)? {
            Ok(())
        } else {
            Err(unknown_property(self.thresholds.name, name))
        }
    }

    fn apply(&self, root: &AstNode, ctx: &mut RuleContext<'_>) {
        let key = OperationMetric::Cyclo.key();
        let options = &self.thresholds.options;

        for op in root.find_descendants_of_kind(NodeKind::OperationDeclaration) {
            if self.thresholds.skips(op) {
                continue;
            }
            let value = operation_value(ctx, key, op, options);
            if value > self.thresholds.minimum {
                self.thresholds
                    .report(self, ctx, op, MetricTarget::Operation, value);
            }
        }

        for ty in root.find_descendants_of_kind(NodeKind::TypeDeclaration) {
            if self.thresholds.skips(ty) {
                continue;
            }
            let computer = ctx.computer();
            let value = computer.compute_with_result_option(
                key,
                ty,
                false,
                options,
                self.aggregation,
                ctx.memoizer(),
            );
            if value > self.thresholds.class_minimum {
                self.thresholds.report(self, ctx, ty, MetricTarget::Type, value);
            }
        }
    }
}

/// Flags operations and types with too many non-commenting source statements.
#[derive(Debug, Clone)]
pub struct NcssCountRule {
    thresholds: Thresholds,
}

impl NcssCountRule {
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::new(
                NCSS_COUNT,
                "The {0} '{1}' has a NCSS line count of {2}.",
                60.0,
                1500.0,
            ),
        }
    }
}

impl Default for NcssCountRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NcssCountRule {
    fn name(&self) -> &str {
        self.thresholds.name
    }

    fn message(&self) -> &str {
        self.thresholds.message
    }

    fn priority(&self) -> Priority {
        self.thresholds.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.thresholds.priority = priority;
    }

    fn set_property(&mut self, name: &str, value: &PropertyValue) -> Result<()> {
        if self.thresholds.set(name, value)? {
            Ok(())
        } else {
            Err(unknown_property(self.thresholds.name, name))
        }
    }

    fn apply(&self, root: &AstNode, ctx: &mut RuleContext<'_>) {
        let options = &self.thresholds.options;

        for op in root.find_descendants_of_kind(NodeKind::OperationDeclaration) {
            if self.thresholds.skips(op) {
                continue;
            }
            let value = operation_value(ctx, OperationMetric::Ncss.key(), op, options);
            if value > self.thresholds.minimum {
                self.thresholds
                    .report(self, ctx, op, MetricTarget::Operation, value);
            }
        }

        for ty in root.find_descendants_of_kind(NodeKind::TypeDeclaration) {
            if self.thresholds.skips(ty) {
                continue;
            }
            let value = type_value(ctx, TypeMetric::Ncss.key(), ty, options);
            if value > self.thresholds.class_minimum {
                self.thresholds.report(self, ctx, ty, MetricTarget::Type, value);
            }
        }
    }
}
