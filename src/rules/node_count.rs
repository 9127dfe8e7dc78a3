//! Depth-first counting of interesting nodes with a per-target threshold.

use crate::ast::{AstNode, NodeKind};
use crate::errors::Result;
use crate::rules::{
    format_message, number_property, unknown_property, PropertyValue, Priority, Rule,
    RuleContext, MINIMUM_DESCRIPTOR,
};

/// How a visited node contributes to the running score.
#[derive(Debug, Clone, PartialEq)]
pub enum Scoring {
    /// Every node counts 1 except the listed kinds.
    AllExcept(Vec<NodeKind>),
    /// Only nodes of this kind count; a counted node scores exactly 1 and its
    /// own children are not scored.
    Only(NodeKind),
    /// The target's score is its line span `end - begin`; nothing is counted.
    Span,
}

/// One evaluated target node whose score exceeded the threshold.
#[derive(Debug, Clone)]
pub struct DataPoint<'a> {
    pub node: &'a AstNode,
    pub score: f64,
    /// Score as reported: integral counts print bare (`3`), spans keep one
    /// decimal (`1001.0`).
    pub label: String,
    pub message: String,
}

/// Reusable "excessive X" rule.
#[derive(Debug, Clone)]
pub struct NodeCountRule {
    name: String,
    message: String,
    priority: Priority,
    target: NodeKind,
    scoring: Scoring,
    minimum: f64,
}

impl NodeCountRule {
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        target: NodeKind,
        scoring: Scoring,
        minimum: f64,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            priority: Priority::Medium,
            target,
            scoring,
            minimum,
        }
    }

    pub fn target(&self) -> NodeKind {
        self.target
    }

    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn set_minimum(&mut self, minimum: f64) {
        self.minimum = minimum;
    }

    /// Every target node in `root` whose score is strictly above the minimum,
    /// in post-order.
    pub fn data_points<'a>(&self, root: &'a AstNode) -> Vec<DataPoint<'a>> {
        let mut points = Vec::new();
        if self.counts_whole(root) {
            return points;
        }

        // (node, next child, summed child scores)
        let mut stack: Vec<(&'a AstNode, usize, f64)> = vec![(root, 0, 0.0)];
        while let Some(top) = stack.last_mut() {
            let (node, next, _) = *top;
            if let Some(child) = node.children().get(next) {
                top.1 += 1;
                if self.counts_whole(child) {
                    top.2 += 1.0;
                } else {
                    stack.push((child, 0, 0.0));
                }
                continue;
            }

            let Some((node, _, children)) = stack.pop() else {
                break;
            };
            let score = self.score(node, children, &mut points);
            if let Some(parent) = stack.last_mut() {
                parent.2 += score;
            }
        }
        points
    }

    /// A counted node scores exactly 1 and is not entered.
    fn counts_whole(&self, node: &AstNode) -> bool {
        matches!(&self.scoring, Scoring::Only(counted)
            if node.kind() == *counted && node.kind() != self.target)
    }

    /// Score of `node` given its children's total, recording a data point
    /// when a target crosses the minimum.
    fn score<'a>(&self, node: &'a AstNode, children: f64, points: &mut Vec<DataPoint<'a>>) -> f64 {
        let score = match &self.scoring {
            Scoring::Span if node.kind() == self.target => node.span().extent() as f64,
            Scoring::Span | Scoring::Only(_) => children,
            Scoring::AllExcept(excluded) if excluded.contains(&node.kind()) => children,
            Scoring::AllExcept(_) => children + 1.0,
        };

        if node.kind() == self.target && score > self.minimum {
            let label = self.label(score);
            points.push(DataPoint {
                node,
                score,
                message: format_message(&self.message, &[label.as_str()]),
                label,
            });
        }

        score
    }

    fn label(&self, score: f64) -> String {
        match self.scoring {
            Scoring::Span => format!("{score:.1}"),
            _ => format!("{score}"),
        }
    }
}

impl Rule for NodeCountRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    fn set_property(&mut self, name: &str, value: &PropertyValue) -> Result<()> {
        match name {
            MINIMUM_DESCRIPTOR => {
                self.minimum = number_property(&self.name, name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(&self.name, name)),
        }
    }

    fn apply(&self, root: &AstNode, ctx: &mut RuleContext<'_>) {
        for point in self.data_points(root) {
            ctx.add_violation(self, point.node, &point.label, &point.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::rules::testing::run;

    fn node(kind: NodeKind, begin: usize, end: usize) -> AstNode {
        AstNode::new(kind, "n", Span::new(begin, end))
    }

    fn unit_with_imports(count: usize) -> AstNode {
        let imports = (0..count).map(|i| {
            node(NodeKind::ImportDeclaration, i + 1, i + 1)
                .with_child(node(NodeKind::Other, i + 1, i + 1))
        });
        node(NodeKind::CompilationUnit, 1, 50)
            .with_children(imports)
            .with_child(node(NodeKind::TypeDeclaration, 10, 50))
    }

    fn import_rule(minimum: f64) -> NodeCountRule {
        NodeCountRule::new(
            "ExcessiveImports",
            "Too many imports",
            NodeKind::CompilationUnit,
            Scoring::Only(NodeKind::ImportDeclaration),
            minimum,
        )
    }

    fn length_rule(minimum: f64) -> NodeCountRule {
        NodeCountRule::new(
            "ExcessiveClassLength",
            "Avoid really long classes.",
            NodeKind::TypeDeclaration,
            Scoring::Span,
            minimum,
        )
    }

    #[test]
    fn three_imports_fire_with_integral_score() {
        let hits = run(&import_rule(1.0), &unit_with_imports(3));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "ExcessiveImports");
        assert_eq!(hits[0].2, "3");
    }

    #[test]
    fn no_imports_do_not_fire() {
        assert!(run(&import_rule(1.0), &unit_with_imports(0)).is_empty());
    }

    #[test]
    fn threshold_is_strict() {
        assert!(run(&import_rule(4.0), &unit_with_imports(4)).is_empty());
        assert_eq!(run(&import_rule(4.0), &unit_with_imports(5)).len(), 1);
    }

    #[test]
    fn class_length_reports_one_decimal() {
        let long = node(NodeKind::TypeDeclaration, 10, 1011);
        let hits = run(&length_rule(1000.0), &long);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].2, "1001.0");

        let exact = node(NodeKind::TypeDeclaration, 10, 1010);
        assert!(run(&length_rule(1000.0), &exact).is_empty());
    }

    #[test]
    fn nested_targets_are_checked_independently() {
        let inner = node(NodeKind::TypeDeclaration, 20, 40);
        let outer = node(NodeKind::TypeDeclaration, 1, 100).with_child(inner);
        let root = node(NodeKind::CompilationUnit, 1, 100).with_child(outer);

        let points = length_rule(10.0).data_points(&root);
        let scores: Vec<f64> = points.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![20.0, 99.0]);
    }

    #[test]
    fn counted_nodes_do_not_recurse() {
        let method = node(NodeKind::OperationDeclaration, 2, 10)
            .with_child(node(NodeKind::OperationDeclaration, 3, 4));
        let class = node(NodeKind::TypeDeclaration, 1, 20)
            .with_child(method)
            .with_child(node(NodeKind::OperationDeclaration, 11, 12));
        let rule = NodeCountRule::new(
            "ExcessiveMethodCount",
            "too many methods",
            NodeKind::TypeDeclaration,
            Scoring::Only(NodeKind::OperationDeclaration),
            1.0,
        );
        let points = rule.data_points(&class);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].score, 2.0);
    }

    #[test]
    fn deep_chains_are_counted_without_recursion() {
        let counted = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let mut chain = node(NodeKind::Other, 1, 1);
                for _ in 0..100_000 {
                    chain = node(NodeKind::Other, 1, 1).with_child(chain);
                }
                let op = node(NodeKind::OperationDeclaration, 1, 2).with_child(chain);
                let rule = NodeCountRule::new(
                    "ExcessiveNodes",
                    "{0} nodes",
                    NodeKind::OperationDeclaration,
                    Scoring::AllExcept(vec![]),
                    10.0,
                );
                let points = rule.data_points(&op);
                points.iter().map(|p| p.score).collect::<Vec<_>>()
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(counted, vec![100_002.0]);
    }

    #[test]
    fn all_except_counts_every_other_node() {
        let list = node(NodeKind::ParameterList, 1, 1)
            .with_child(node(NodeKind::Parameter, 1, 1))
            .with_child(node(NodeKind::Parameter, 1, 1).with_child(node(NodeKind::Other, 1, 1)));
        let rule = NodeCountRule::new(
            "DenseParameters",
            "{0} nodes",
            NodeKind::ParameterList,
            Scoring::AllExcept(vec![NodeKind::Other]),
            0.0,
        );
        let points = rule.data_points(&list);
        // the list itself plus two parameters; the Other node is excluded
        assert_eq!(points[0].score, 3.0);
        assert_eq!(points[0].message, "3 nodes");
    }

    #[test]
    fn minimum_property_is_configurable() {
        let mut rule = import_rule(1.0);
        rule.set_property(MINIMUM_DESCRIPTOR, &PropertyValue::Number(30.0))
            .unwrap();
        assert_eq!(rule.minimum(), 30.0);
        assert!(rule
            .set_property("maximum", &PropertyValue::Number(1.0))
            .is_err());
        assert!(rule
            .set_property(MINIMUM_DESCRIPTOR, &PropertyValue::Flag(true))
            .is_err());
    }
}
