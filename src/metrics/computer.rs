use crate::ast::{AstNode, NodeKind};
use crate::metrics::key::{MetricKey, MetricOptions, MetricTarget, ParameterizedMetricKey};
use crate::metrics::memo::{MetricMemoizer, ProjectMemoizer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How per-operation values are reduced to one value for the enclosing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOption {
    #[default]
    Sum,
    Highest,
    Average,
    /// Any mode without a defined reduction. Aggregates to NaN.
    #[serde(other)]
    Unsupported,
}

impl ResultOption {
    /// Lenient parse: unknown names map to [`ResultOption::Unsupported`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sum" => ResultOption::Sum,
            "highest" | "max" => ResultOption::Highest,
            "average" | "avg" | "mean" => ResultOption::Average,
            _ => ResultOption::Unsupported,
        }
    }

    /// Reduce collected operation values.
    ///
    /// Empty input gives 0 for every defined mode.
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            ResultOption::Sum => sum(values),
            ResultOption::Highest => highest(values),
            ResultOption::Average => average(values),
            ResultOption::Unsupported => f64::NAN,
        }
    }
}

impl fmt::Display for ResultOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultOption::Sum => write!(f, "sum"),
            ResultOption::Highest => write!(f, "highest"),
            ResultOption::Average => write!(f, "average"),
            ResultOption::Unsupported => write!(f, "unsupported"),
        }
    }
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn highest(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        0.0
    } else {
        max
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

/// Look up `(key, options)` in `memoizer`, computing and storing it on a miss
/// or when `force` is set.
fn compute_memoized(
    key: &MetricKey,
    node: &AstNode,
    force: bool,
    options: &MetricOptions,
    memoizer: &mut MetricMemoizer,
) -> f64 {
    let param_key = ParameterizedMetricKey::get_instance(key, options);
    if !force {
        // A stored NaN is a valid result and must not trigger recomputation.
        if let Some(prev) = memoizer.get_memo(&param_key) {
            return prev;
        }
    }

    let value = key.calculator().compute(node, options);
    memoizer.memoize(param_key, value);
    value
}

/// Computes and memoizes metrics for one language.
///
/// Only `find_operations` is language specific; memoization and aggregation
/// are shared.
pub trait MetricsComputer: Send + Sync {
    /// Operation declarations that belong to `type_node`.
    fn find_operations<'a>(&self, type_node: &'a AstNode) -> Vec<&'a AstNode>;

    /// Memoized value of a type-level metric. A key targeting operations is a
    /// computation gap and yields NaN without touching the memoizer.
    fn compute_for_type(
        &self,
        key: &MetricKey,
        node: &AstNode,
        force: bool,
        options: &MetricOptions,
        memoizer: &mut MetricMemoizer,
    ) -> f64 {
        if key.target() != MetricTarget::Type {
            tracing::debug!("{key} requested on a type declaration");
            return f64::NAN;
        }
        compute_memoized(key, node, force, options, memoizer)
    }

    /// Memoized value of an operation-level metric.
    fn compute_for_operation(
        &self,
        key: &MetricKey,
        node: &AstNode,
        force: bool,
        options: &MetricOptions,
        memoizer: &mut MetricMemoizer,
    ) -> f64 {
        if key.target() != MetricTarget::Operation {
            tracing::debug!("{key} requested on an operation declaration");
            return f64::NAN;
        }
        compute_memoized(key, node, force, options, memoizer)
    }

    /// Compute an operation metric for every supported operation of
    /// `type_node` and reduce the values with `option`.
    ///
    /// Per-operation values are memoized in `project` under the operation's
    /// qualified name. NaN values are left out of the reduction.
    fn compute_with_result_option(
        &self,
        key: &MetricKey,
        type_node: &AstNode,
        force: bool,
        options: &MetricOptions,
        option: ResultOption,
        project: &mut ProjectMemoizer,
    ) -> f64 {
        let operations = self.find_operations(type_node);

        let mut values = Vec::with_capacity(operations.len());
        for op in operations {
            if !key.supports(op) {
                continue;
            }

            let value = match op.qualified_name() {
                Some(name) => {
                    let memo = project.operation_memoizer(name);
                    self.compute_for_operation(key, op, force, options, memo)
                }
                None => {
                    tracing::debug!(
                        "operation at line {} has no qualified name; computing unmemoized",
                        op.begin_line()
                    );
                    let mut scratch = MetricMemoizer::new();
                    self.compute_for_operation(key, op, force, options, &mut scratch)
                }
            };

            if !value.is_nan() {
                values.push(value);
            }
        }

        option.reduce(&values)
    }
}

/// Operations declared directly in `type_node`: every operation found below it
/// without entering nested type declarations.
pub fn declared_operations(type_node: &AstNode) -> Vec<&AstNode> {
    type_node
        .descendants_within(NodeKind::TypeDeclaration)
        .filter(|n| n.kind() == NodeKind::OperationDeclaration)
        .collect()
}

/// Default computer for trees produced by the bundled frontends, which all
/// nest operations lexically inside their owning type.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationComputer;

impl MetricsComputer for DeclarationComputer {
    fn find_operations<'a>(&self, type_node: &'a AstNode) -> Vec<&'a AstNode> {
        declared_operations(type_node)
    }
}
