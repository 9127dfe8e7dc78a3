//! Rule model: the `Rule` trait, rule properties, and the context rules report through.

pub mod complexity;
pub mod design;
pub mod node_count;
pub mod ruleset;

pub use node_count::{DataPoint, NodeCountRule, Scoring};
pub use ruleset::{get_rule_sets, BuiltinRuleSetFactory, RuleSet, RuleSetFactory, RuleSets};

use crate::ast::AstNode;
use crate::errors::{Result, TallyError};
use crate::metrics::{MetricsComputer, ProjectMemoizer};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Name of the threshold property every counting and metric rule exposes.
pub const MINIMUM_DESCRIPTOR: &str = "minimum";

/// Rule importance, 1 (high) to 5 (low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Priority {
    High = 1,
    MediumHigh = 2,
    Medium = 3,
    MediumLow = 4,
    Low = 5,
}

impl Priority {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Priority::High),
            2 => Some(Priority::MediumHigh),
            3 => Some(Priority::Medium),
            4 => Some(Priority::MediumLow),
            5 => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.level()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// A value assigned to a named rule property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Flag(b) => write!(f, "{b}"),
            PropertyValue::Text(s) => write!(f, "{s}"),
            PropertyValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Error for a property a rule does not declare.
pub(crate) fn unknown_property(rule: &str, property: &str) -> TallyError {
    TallyError::Config(format!("rule {rule} has no property '{property}'"))
}

/// Error for a declared property given a value of the wrong shape.
pub(crate) fn invalid_property(rule: &str, property: &str, expected: &str) -> TallyError {
    TallyError::Config(format!("rule {rule}: property '{property}' expects {expected}"))
}

pub(crate) fn number_property(rule: &str, property: &str, value: &PropertyValue) -> Result<f64> {
    value
        .as_number()
        .ok_or_else(|| invalid_property(rule, property, "a number"))
}

/// Substitute `{0}`, `{1}`, ... in a message template.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut message = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{i}}}"), arg);
    }
    message
}

/// A check run over one parsed source tree.
///
/// Rules are configured before a run and then shared read-only across
/// worker threads.
pub trait Rule: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Message template reported with each violation.
    fn message(&self) -> &str;

    fn priority(&self) -> Priority;

    fn set_priority(&mut self, priority: Priority);

    /// Assign a named property. Unknown names and ill-typed values are
    /// configuration errors.
    fn set_property(&mut self, name: &str, value: &PropertyValue) -> Result<()>;

    fn apply(&self, root: &AstNode, ctx: &mut RuleContext<'_>);
}

/// Receiver of rule violations.
pub trait ViolationSink {
    fn add_violation(&mut self, rule: &dyn Rule, node: &AstNode, score: &str, message: &str);
}

/// Everything a rule needs while evaluating one file.
pub struct RuleContext<'a> {
    file: &'a Path,
    sink: &'a mut dyn ViolationSink,
    memoizer: &'a mut ProjectMemoizer,
    computer: &'a dyn MetricsComputer,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        file: &'a Path,
        sink: &'a mut dyn ViolationSink,
        memoizer: &'a mut ProjectMemoizer,
        computer: &'a dyn MetricsComputer,
    ) -> Self {
        Self {
            file,
            sink,
            memoizer,
            computer,
        }
    }

    pub fn file(&self) -> &Path {
        self.file
    }

    pub fn computer(&self) -> &'a dyn MetricsComputer {
        self.computer
    }

    pub fn memoizer(&mut self) -> &mut ProjectMemoizer {
        &mut *self.memoizer
    }

    pub fn add_violation(&mut self, rule: &dyn Rule, node: &AstNode, score: &str, message: &str) {
        self.sink.add_violation(rule, node, score, message);
    }
}
