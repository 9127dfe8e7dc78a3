use crate::ast::NodeKind;
use crate::parse::common::node_text;
use crate::parse::ParseFrontend;
use tree_sitter::Node;

pub struct PythonFrontend;

impl PythonFrontend {
    pub fn new() -> Self {
        Self
    }

    fn is_parameter(node: &Node<'_>) -> bool {
        let in_parameters = node.parent().is_some_and(|p| p.kind() == "parameters");
        in_parameters
            && matches!(
                node.kind(),
                "identifier"
                    | "typed_parameter"
                    | "default_parameter"
                    | "typed_default_parameter"
                    | "list_splat_pattern"
                    | "dictionary_splat_pattern"
            )
    }
}

impl Default for PythonFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseFrontend for PythonFrontend {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn classify(&self, node: &Node<'_>, _source: &[u8]) -> NodeKind {
        if Self::is_parameter(node) {
            return NodeKind::Parameter;
        }
        match node.kind() {
            "module" => NodeKind::CompilationUnit,
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                NodeKind::ImportDeclaration
            }
            "class_definition" => NodeKind::TypeDeclaration,
            "function_definition" => NodeKind::OperationDeclaration,
            "parameters" => NodeKind::ParameterList,
            "decorator" => NodeKind::Annotation,
            "block" => NodeKind::Block,
            "if_statement"
            | "elif_clause"
            | "for_statement"
            | "while_statement"
            | "except_clause"
            | "conditional_expression"
            | "case_clause"
            | "for_in_clause"
            | "if_clause" => NodeKind::Branch,
            "boolean_operator" => NodeKind::BooleanOperator,
            kind if kind.ends_with("_statement") => NodeKind::Statement,
            _ => NodeKind::Other,
        }
    }

    /// `@name`, `@pkg.name` and `@name(...)` all resolve to the dotted name.
    fn annotation_name(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        let expr = node.named_child(0)?;
        let target = if expr.kind() == "call" {
            expr.child_by_field_name("function")?
        } else {
            expr
        };
        Some(node_text(&target, source))
    }

    fn parameter_type(&self, param: &Node<'_>, source: &[u8]) -> String {
        match param.child_by_field_name("type") {
            Some(ty) => node_text(&ty, source),
            None => "_".to_string(),
        }
    }

    /// Decorators live on the enclosing `decorated_definition`.
    fn attached_annotations<'t>(&self, node: &Node<'t>) -> Vec<Node<'t>> {
        let Some(parent) = node.parent() else {
            return Vec::new();
        };
        if parent.kind() != "decorated_definition" {
            return Vec::new();
        }
        let mut cursor = parent.walk();
        parent
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::query::is_test_declaration;
    use crate::ast::AstNode;
    use std::path::Path;

    fn parse(source: &str) -> AstNode {
        PythonFrontend::new()
            .parse(source.as_bytes(), Path::new("pkg/ledger.py"))
            .unwrap()
    }

    const SOURCE: &str = r#"import os
from typing import List

class Ledger:
    def post(self, amount: int, memo=None):
        if amount > 0 and memo:
            self.total += amount
        elif amount < 0:
            raise ValueError("negative")
        return self.total

def summarize(entries: List[int]) -> int:
    return sum(e for e in entries if e)
"#;

    #[test]
    fn lowers_module() {
        let unit = parse(SOURCE);
        assert_eq!(
            unit.find_descendants_of_kind(NodeKind::ImportDeclaration)
                .count(),
            2
        );

        let ops: Vec<String> = unit
            .find_descendants_of_kind(NodeKind::OperationDeclaration)
            .filter_map(|o| o.qualified_name().map(|q| q.to_string()))
            .collect();
        assert_eq!(
            ops,
            vec!["ledger.Ledger#post(_,int,_)", "ledger#summarize(List[int])"]
        );
    }

    #[test]
    fn counts_parameters_and_decisions() {
        let unit = parse(SOURCE);
        let post = unit
            .find_descendants_of_kind(NodeKind::OperationDeclaration)
            .next()
            .unwrap();
        assert_eq!(post.find_descendants_of_kind(NodeKind::Parameter).count(), 3);
        // if + elif
        assert_eq!(post.find_descendants_of_kind(NodeKind::Branch).count(), 2);
        assert_eq!(
            post.find_descendants_of_kind(NodeKind::BooleanOperator)
                .count(),
            1
        );
    }

    #[test]
    fn decorators_attach_to_definitions() {
        let unit = parse("import pytest\n\n@pytest.fixture\ndef ledger():\n    return 1\n\n@test\ndef posts():\n    pass\n");
        let ops: Vec<&AstNode> = unit
            .find_descendants_of_kind(NodeKind::OperationDeclaration)
            .collect();
        assert_eq!(ops.len(), 2);
        assert!(!is_test_declaration(ops[0]));
        assert!(is_test_declaration(ops[1]));
    }
}
