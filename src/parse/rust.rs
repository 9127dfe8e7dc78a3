use crate::ast::NodeKind;
use crate::parse::common::{field_text, is_short_circuit, node_text};
use crate::parse::ParseFrontend;
use tree_sitter::Node;

pub struct RustFrontend;

impl RustFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseFrontend for RustFrontend {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn classify(&self, node: &Node<'_>, _source: &[u8]) -> NodeKind {
        match node.kind() {
            "source_file" => NodeKind::CompilationUnit,
            "use_declaration" | "extern_crate_declaration" => NodeKind::ImportDeclaration,
            "struct_item" | "enum_item" | "union_item" | "trait_item" | "impl_item" => {
                NodeKind::TypeDeclaration
            }
            "function_item" | "function_signature_item" => NodeKind::OperationDeclaration,
            "field_declaration" => NodeKind::FieldDeclaration,
            "parameters" => NodeKind::ParameterList,
            "parameter" | "self_parameter" | "variadic_parameter" => NodeKind::Parameter,
            "attribute_item" => NodeKind::Annotation,
            "block" => NodeKind::Block,
            "if_expression" | "match_arm" | "while_expression" | "loop_expression"
            | "for_expression" => NodeKind::Branch,
            "binary_expression" if is_short_circuit(node) => NodeKind::BooleanOperator,
            "expression_statement" | "let_declaration" => NodeKind::Statement,
            _ => NodeKind::Other,
        }
    }

    /// Impl blocks are named like qualified paths: `<Cache>`, `<Cache as Drop>`.
    fn declaration_name(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        if node.kind() != "impl_item" {
            return field_text(node, "name", source);
        }
        let ty = field_text(node, "type", source)?;
        match field_text(node, "trait", source) {
            Some(tr) => Some(format!("<{ty} as {tr}>")),
            None => Some(format!("<{ty}>")),
        }
    }

    /// `#[test]` -> `test`, `#[tokio::test]` -> `tokio::test`.
    fn annotation_name(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        let attribute = node.named_child(0)?;
        let path = attribute.named_child(0)?;
        Some(node_text(&path, source))
    }

    fn parameter_type(&self, param: &Node<'_>, source: &[u8]) -> String {
        match param.kind() {
            "self_parameter" => node_text(param, source),
            "variadic_parameter" => "...".to_string(),
            _ => field_text(param, "type", source).unwrap_or_else(|| "_".to_string()),
        }
    }

    /// Inline modules scope what they declare: `ledger.tests#posts()`.
    fn scope_segment(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        if node.kind() == "mod_item" {
            field_text(node, "name", source)
        } else {
            None
        }
    }

    /// Outer attributes are preceding siblings of the item.
    fn attached_annotations<'t>(&self, node: &Node<'t>) -> Vec<Node<'t>> {
        let mut attributes = Vec::new();
        let mut prev = node.prev_named_sibling();
        while let Some(sibling) = prev {
            match sibling.kind() {
                "attribute_item" => attributes.push(sibling),
                "line_comment" | "block_comment" => {}
                _ => break,
            }
            prev = sibling.prev_named_sibling();
        }
        attributes.reverse();
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::query::is_test_declaration;
    use crate::ast::AstNode;
    use std::path::Path;

    fn parse(source: &str) -> AstNode {
        RustFrontend::new()
            .parse(source.as_bytes(), Path::new("src/ledger.rs"))
            .unwrap()
    }

    const SOURCE: &str = r#"use std::collections::HashMap;

pub struct Ledger {
    entries: HashMap<String, i64>,
}

impl Ledger {
    pub fn post(&mut self, account: &str, amount: i64) -> bool {
        if amount == 0 || account.is_empty() {
            return false;
        }
        let entry = self.entries.entry(account.to_string()).or_insert(0);
        *entry += amount;
        true
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn posts() {}
}
"#;

    #[test]
    fn lowers_items() {
        let unit = parse(SOURCE);
        let types: Vec<String> = unit
            .find_descendants_of_kind(NodeKind::TypeDeclaration)
            .filter_map(|t| t.qualified_name().map(|q| q.to_string()))
            .collect();
        assert_eq!(types, vec!["ledger.Ledger", "ledger.<Ledger>"]);

        let ops: Vec<String> = unit
            .find_descendants_of_kind(NodeKind::OperationDeclaration)
            .filter_map(|o| o.qualified_name().map(|q| q.to_string()))
            .collect();
        assert_eq!(
            ops,
            vec!["ledger.<Ledger>#post(&mut self,&str,i64)", "ledger.tests#posts()"]
        );
    }

    #[test]
    fn attributes_mark_tests() {
        let unit = parse(SOURCE);
        let ops: Vec<&AstNode> = unit
            .find_descendants_of_kind(NodeKind::OperationDeclaration)
            .collect();
        assert!(!is_test_declaration(ops[0]));
        assert!(is_test_declaration(ops[1]));
    }

    #[test]
    fn decisions_in_post() {
        let unit = parse(SOURCE);
        let post = unit
            .find_descendants_of_kind(NodeKind::OperationDeclaration)
            .next()
            .unwrap();
        assert_eq!(post.find_descendants_of_kind(NodeKind::Branch).count(), 1);
        assert_eq!(
            post.find_descendants_of_kind(NodeKind::BooleanOperator)
                .count(),
            1
        );
        assert_eq!(post.children_of_kind(NodeKind::ParameterList).count(), 1);
    }

    #[test]
    fn split_impl_blocks_get_ordinals() {
        let unit = parse(
            r#"struct Foo;

impl Foo {
    fn a(&self) -> u32 { 1 }
}

impl Foo {
    fn a(&self, n: u32) -> u32 { if n > 0 { n } else { 0 } }
}

impl Clone for Foo {
    fn clone(&self) -> Self { Foo }
}
"#,
        );
        let names: Vec<String> = unit
            .descendants()
            .filter_map(|n| n.qualified_name().map(|q| q.to_string()))
            .collect();
        assert_eq!(
            names,
            vec![
                "ledger.Foo",
                "ledger.<Foo>",
                "ledger.<Foo>#a(&self)",
                "ledger.<Foo>$1",
                "ledger.<Foo>$1#a(&self,u32)",
                "ledger.<Foo as Clone>",
                "ledger.<Foo as Clone>#clone(&self)",
            ]
        );
    }
}
