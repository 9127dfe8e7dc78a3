//! Built-in metric keys and their calculators.

use crate::ast::{AstNode, NodeKind};
use crate::metrics::computer::declared_operations;
use crate::metrics::key::{MetricCalculator, MetricKey, MetricOptions, MetricTarget};
use once_cell::sync::Lazy;
use std::fmt;

/// CYCLO option: do not count `&&` / `||` as decision points.
pub const IGNORE_BOOLEAN_PATHS: &str = "ignore_boolean_paths";
/// NOM option: also count operations of nested types.
pub const COUNT_NESTED: &str = "count_nested";

/// Lines spanned by the declaration, inclusive.
#[derive(Debug, Clone, Copy)]
pub struct LocCalculator;

impl MetricCalculator for LocCalculator {
    fn compute(&self, node: &AstNode, _options: &MetricOptions) -> f64 {
        (node.span().extent() + 1) as f64
    }
}

/// Non-commenting source statements.
#[derive(Debug, Clone, Copy)]
pub struct NcssCalculator;

impl MetricCalculator for NcssCalculator {
    fn compute(&self, node: &AstNode, _options: &MetricOptions) -> f64 {
        let statements = node
            .descendants()
            .filter(|n| matches!(n.kind(), NodeKind::Statement | NodeKind::Branch))
            .count();
        (statements + 1) as f64
    }
}

/// McCabe cyclomatic complexity of one operation.
#[derive(Debug, Clone, Copy)]
pub struct CycloCalculator;

impl MetricCalculator for CycloCalculator {
    fn compute(&self, node: &AstNode, options: &MetricOptions) -> f64 {
        let count_boolean = !options.contains(IGNORE_BOOLEAN_PATHS);
        let decisions = node
            .descendants_within(NodeKind::TypeDeclaration)
            .filter(|n| match n.kind() {
                NodeKind::Branch => true,
                NodeKind::BooleanOperator => count_boolean,
                _ => false,
            })
            .count();
        (decisions + 1) as f64
    }
}

/// Number of formal parameters.
#[derive(Debug, Clone, Copy)]
pub struct ParamsCalculator;

impl MetricCalculator for ParamsCalculator {
    fn compute(&self, node: &AstNode, _options: &MetricOptions) -> f64 {
        node.children_of_kind(NodeKind::ParameterList)
            .flat_map(|list| list.children_of_kind(NodeKind::Parameter))
            .count() as f64
    }

    fn supports(&self, node: &AstNode) -> bool {
        node.first_child_of_kind(NodeKind::ParameterList).is_some()
    }
}

/// Number of operations.
#[derive(Debug, Clone, Copy)]
pub struct NomCalculator;

impl MetricCalculator for NomCalculator {
    fn compute(&self, node: &AstNode, options: &MetricOptions) -> f64 {
        if options.contains(COUNT_NESTED) {
            node.find_descendants_of_kind(NodeKind::OperationDeclaration)
                .count() as f64
        } else {
            declared_operations(node).len() as f64
        }
    }
}

/// Weighted method count: CYCLO summed over the type's own operations.
#[derive(Debug, Clone, Copy)]
pub struct WmcCalculator;

impl MetricCalculator for WmcCalculator {
    fn compute(&self, node: &AstNode, options: &MetricOptions) -> f64 {
        declared_operations(node)
            .into_iter()
            .map(|op| CycloCalculator.compute(op, options))
            .sum()
    }
}

static TYPE_LOC: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("LOC", MetricTarget::Type, LocCalculator));
static TYPE_NCSS: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("NCSS", MetricTarget::Type, NcssCalculator));
static TYPE_NOM: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("NOM", MetricTarget::Type, NomCalculator));
static TYPE_WMC: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("WMC", MetricTarget::Type, WmcCalculator));

static OP_LOC: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("LOC", MetricTarget::Operation, LocCalculator));
static OP_NCSS: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("NCSS", MetricTarget::Operation, NcssCalculator));
static OP_CYCLO: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("CYCLO", MetricTarget::Operation, CycloCalculator));
static OP_PARAMS: Lazy<MetricKey> =
    Lazy::new(|| MetricKey::new("PARAMS", MetricTarget::Operation, ParamsCalculator));

/// Metrics computed on type declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeMetric {
    Loc,
    Ncss,
    Nom,
    Wmc,
}

impl TypeMetric {
    pub const ALL: [TypeMetric; 4] = [
        TypeMetric::Loc,
        TypeMetric::Ncss,
        TypeMetric::Nom,
        TypeMetric::Wmc,
    ];

    pub fn key(self) -> &'static MetricKey {
        match self {
            TypeMetric::Loc => &*TYPE_LOC,
            TypeMetric::Ncss => &*TYPE_NCSS,
            TypeMetric::Nom => &*TYPE_NOM,
            TypeMetric::Wmc => &*TYPE_WMC,
        }
    }

    pub fn name(self) -> &'static str {
        self.key().name()
    }
}

impl fmt::Display for TypeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metrics computed on operation declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMetric {
    Loc,
    Ncss,
    Cyclo,
    Params,
}

impl OperationMetric {
    pub const ALL: [OperationMetric; 4] = [
        OperationMetric::Loc,
        OperationMetric::Ncss,
        OperationMetric::Cyclo,
        OperationMetric::Params,
    ];

    pub fn key(self) -> &'static MetricKey {
        match self {
            OperationMetric::Loc => &*OP_LOC,
            OperationMetric::Ncss => &*OP_NCSS,
            OperationMetric::Cyclo => &*OP_CYCLO,
            OperationMetric::Params => &*OP_PARAMS,
        }
    }

    pub fn name(self) -> &'static str {
        self.key().name()
    }
}

impl fmt::Display for OperationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
