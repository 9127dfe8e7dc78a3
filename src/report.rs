use crate::ast::AstNode;
use crate::rules::{Priority, Rule, ViolationSink};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One rule firing on one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub rule: String,
    pub file: PathBuf,
    pub begin_line: usize,
    pub end_line: usize,
    /// Qualified name of the offending declaration, if it is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    pub score: String,
    pub message: String,
    pub priority: Priority,
}

/// Violations collected for one file, or merged across files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    #[serde(skip)]
    file: PathBuf,
    violations: Vec<Violation>,
}

impl Report {
    /// Report whose violations are attributed to `file`.
    pub fn for_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            violations: Vec::new(),
        }
    }

    /// Report over already collected violations.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            file: PathBuf::new(),
            violations,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn merge(&mut self, other: Report) {
        self.violations.extend(other.violations);
    }

    /// Order by file, then line, then rule name.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.begin_line.cmp(&b.begin_line))
                .then_with(|| a.rule.cmp(&b.rule))
        });
    }

    /// Violations grouped by file, in sorted order.
    pub fn by_file(&self) -> Vec<(&Path, Vec<&Violation>)> {
        let mut groups: Vec<(&Path, Vec<&Violation>)> = Vec::new();
        for v in &self.violations {
            match groups.last_mut() {
                Some((file, items)) if *file == v.file.as_path() => items.push(v),
                _ => groups.push((v.file.as_path(), vec![v])),
            }
        }
        groups
    }
}

impl ViolationSink for Report {
    fn add_violation(&mut self, rule: &dyn Rule, node: &AstNode, score: &str, message: &str) {
        self.violations.push(Violation {
            rule: rule.name().to_string(),
            file: self.file.clone(),
            begin_line: node.begin_line(),
            end_line: node.end_line(),
            declaration: node.qualified_name().map(|q| q.to_string()),
            score: score.to_string(),
            message: message.to_string(),
            priority: rule.priority(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, QualifiedName, Span};
    use crate::rules::design::excessive_class_length;

    fn class(begin: usize, end: usize) -> AstNode {
        AstNode::new(NodeKind::TypeDeclaration, "class_declaration", Span::new(begin, end))
            .with_qualified_name(QualifiedName::new("app.Ledger"))
    }

    #[test]
    fn sink_records_node_and_rule() {
        let rule = excessive_class_length();
        let mut report = Report::for_file("src/Ledger.java");
        report.add_violation(&rule, &class(3, 90), "87.0", "Avoid really long classes.");

        let v = &report.violations()[0];
        assert_eq!(v.rule, "ExcessiveClassLength");
        assert_eq!(v.file, PathBuf::from("src/Ledger.java"));
        assert_eq!((v.begin_line, v.end_line), (3, 90));
        assert_eq!(v.declaration.as_deref(), Some("app.Ledger"));
        assert_eq!(v.priority, Priority::Medium);
    }

    #[test]
    fn merge_sort_and_group() {
        let rule = excessive_class_length();
        let mut b = Report::for_file("b.java");
        b.add_violation(&rule, &class(5, 9), "4.0", "m");
        let mut a = Report::for_file("a.java");
        a.add_violation(&rule, &class(20, 30), "10.0", "m");
        a.add_violation(&rule, &class(1, 40), "39.0", "m");

        let mut all = Report::default();
        all.merge(b);
        all.merge(a);
        all.sort();

        let lines: Vec<usize> = all.violations().iter().map(|v| v.begin_line).collect();
        assert_eq!(lines, vec![1, 20, 5]);

        let groups = all.by_file();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Path::new("a.java"));
        assert_eq!(groups[0].1.len(), 2);
    }
}
