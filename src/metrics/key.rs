use crate::ast::{AstNode, NodeKind};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The declaration kind a metric is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricTarget {
    Type,
    Operation,
}

impl MetricTarget {
    pub fn node_kind(self) -> NodeKind {
        match self {
            MetricTarget::Type => NodeKind::TypeDeclaration,
            MetricTarget::Operation => NodeKind::OperationDeclaration,
        }
    }
}

impl fmt::Display for MetricTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricTarget::Type => write!(f, "type"),
            MetricTarget::Operation => write!(f, "operation"),
        }
    }
}

/// Pure function from a declaration and options to a value.
///
/// Returning `f64::NAN` means the metric does not apply to the node.
pub trait MetricCalculator: Send + Sync {
    fn compute(&self, node: &AstNode, options: &MetricOptions) -> f64;

    /// Whether the calculator can produce a value for `node`.
    fn supports(&self, _node: &AstNode) -> bool {
        true
    }
}

impl<F> MetricCalculator for F
where
    F: Fn(&AstNode, &MetricOptions) -> f64 + Send + Sync,
{
    fn compute(&self, node: &AstNode, options: &MetricOptions) -> f64 {
        self(node, options)
    }
}

/// Identity of a metric plus the calculator that produces it.
///
/// Two keys are equal when name and target are equal; the calculator is not
/// part of the identity.
#[derive(Clone)]
pub struct MetricKey {
    name: Arc<str>,
    target: MetricTarget,
    calculator: Arc<dyn MetricCalculator>,
}

impl MetricKey {
    pub fn new(
        name: &str,
        target: MetricTarget,
        calculator: impl MetricCalculator + 'static,
    ) -> Self {
        Self {
            name: Arc::from(name),
            target,
            calculator: Arc::new(calculator),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> MetricTarget {
        self.target
    }

    pub fn calculator(&self) -> &dyn MetricCalculator {
        self.calculator.as_ref()
    }

    /// A key supports a node of its own target kind that its calculator accepts.
    pub fn supports(&self, node: &AstNode) -> bool {
        node.kind() == self.target.node_kind() && self.calculator.supports(node)
    }
}

impl PartialEq for MetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.name == other.name
    }
}

impl Eq for MetricKey {}

impl Hash for MetricKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.target.hash(state);
    }
}

impl fmt::Debug for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricKey")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.target)
    }
}

/// Immutable, order-insensitive set of named calculator options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MetricOptions(BTreeSet<String>);

impl MetricOptions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(options.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, option: &str) -> bool {
        self.0.contains(option)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for MetricOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", joined.join(", "))
    }
}

struct Interned {
    key: MetricKey,
    options: MetricOptions,
}

/// Memoization key: a metric together with the options it was computed with.
///
/// Instances are interned, so equal `(key, options)` pairs share one
/// allocation and usually compare by pointer.
#[derive(Clone)]
pub struct ParameterizedMetricKey(Arc<Interned>);

static REGISTRY: Lazy<DashMap<(MetricKey, MetricOptions), ParameterizedMetricKey>> =
    Lazy::new(DashMap::new);

impl ParameterizedMetricKey {
    /// Canonical instance for `(key, options)`.
    pub fn get_instance(key: &MetricKey, options: &MetricOptions) -> Self {
        let lookup = (key.clone(), options.clone());
        if let Some(existing) = REGISTRY.get(&lookup) {
            return existing.value().clone();
        }
        REGISTRY
            .entry(lookup)
            .or_insert_with(|| {
                Self(Arc::new(Interned {
                    key: key.clone(),
                    options: options.clone(),
                }))
            })
            .value()
            .clone()
    }

    /// Forget every interned key. Only call between independent analysis runs.
    pub fn clear_registry() {
        REGISTRY.clear();
    }

    pub fn key(&self) -> &MetricKey {
        &self.0.key
    }

    pub fn options(&self) -> &MetricOptions {
        &self.0.options
    }

    /// Whether both handles point at the same interned instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ParameterizedMetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
            || (self.0.key == other.0.key && self.0.options == other.0.options)
    }
}

impl Eq for ParameterizedMetricKey {}

impl Hash for ParameterizedMetricKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.key.hash(state);
        self.0.options.hash(state);
    }
}

impl fmt::Debug for ParameterizedMetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParameterizedMetricKey({}, {})", self.0.key, self.0.options)
    }
}
