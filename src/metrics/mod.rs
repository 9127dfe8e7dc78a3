//! Metric keys, memoization and aggregation over declarations.

pub mod catalog;
pub mod computer;
pub mod key;
pub mod memo;

pub use catalog::{OperationMetric, TypeMetric};
pub use computer::{DeclarationComputer, MetricsComputer, ResultOption};
pub use key::{MetricCalculator, MetricKey, MetricOptions, MetricTarget, ParameterizedMetricKey};
pub use memo::{MetricMemoizer, ProjectMemoizer};
