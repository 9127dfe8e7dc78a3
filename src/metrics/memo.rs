use crate::ast::QualifiedName;
use crate::metrics::key::ParameterizedMetricKey;
use std::collections::HashMap;

/// Per-declaration cache of computed metric values.
///
/// Presence is tracked by the map itself, so a stored NaN is still a hit.
#[derive(Debug, Default, Clone)]
pub struct MetricMemoizer {
    memo: HashMap<ParameterizedMetricKey, f64>,
}

impl MetricMemoizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously memoized value, or `None` if never computed.
    pub fn get_memo(&self, key: &ParameterizedMetricKey) -> Option<f64> {
        self.memo.get(key).copied()
    }

    pub fn memoize(&mut self, key: ParameterizedMetricKey, value: f64) {
        self.memo.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }
}

/// Memoizers for every declaration of one analysis unit, keyed by qualified name.
///
/// Owned by a single worker; never shared between files analysed in parallel.
#[derive(Debug, Default)]
pub struct ProjectMemoizer {
    types: HashMap<QualifiedName, MetricMemoizer>,
    operations: HashMap<QualifiedName, MetricMemoizer>,
}

impl ProjectMemoizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoizer of the type named `name`, created on first request.
    pub fn type_memoizer(&mut self, name: &QualifiedName) -> &mut MetricMemoizer {
        self.types.entry(name.clone()).or_default()
    }

    /// Memoizer of the operation named `name`, created on first request.
    pub fn operation_memoizer(&mut self, name: &QualifiedName) -> &mut MetricMemoizer {
        self.operations.entry(name.clone()).or_default()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Total number of memoized values across all declarations.
    pub fn memo_count(&self) -> usize {
        self.types
            .values()
            .chain(self.operations.values())
            .map(MetricMemoizer::len)
            .sum()
    }
}
