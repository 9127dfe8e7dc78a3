use crate::ast::NodeKind;
use crate::parse::common::{file_module_name, is_field_of_parent, is_short_circuit, node_text};
use crate::parse::ParseFrontend;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::Node;

pub struct GoFrontend;

impl GoFrontend {
    pub fn new() -> Self {
        Self
    }

    fn package_name(&self, root: &Node<'_>, source: &[u8]) -> Option<String> {
        let lang = self.language();
        let query_str = r#"(package_clause (package_identifier) @name)"#;
        let query = match tree_sitter::Query::new(&lang, query_str) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!("failed to compile Go package query: {e}");
                return None;
            }
        };

        let mut cursor = tree_sitter::QueryCursor::new();
        let mut matches = cursor.matches(&query, *root, source);
        while let Some(m) = matches.next() {
            if let Some(capture) = m.captures.first() {
                return Some(node_text(&capture.node, source));
            }
        }
        None
    }
}

impl Default for GoFrontend {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip pointers and type arguments from a receiver type: `*Cache[K]` -> `Cache`.
fn receiver_type_name(text: &str) -> String {
    let bare = text.trim_start_matches('*');
    bare.split('[').next().unwrap_or(bare).trim().to_string()
}

impl ParseFrontend for GoFrontend {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn classify(&self, node: &Node<'_>, _source: &[u8]) -> NodeKind {
        match node.kind() {
            "source_file" => NodeKind::CompilationUnit,
            "import_spec" => NodeKind::ImportDeclaration,
            "type_spec" | "type_alias" => NodeKind::TypeDeclaration,
            "function_declaration" | "method_declaration" | "method_elem" => {
                NodeKind::OperationDeclaration
            }
            "field_declaration" => NodeKind::FieldDeclaration,
            // receivers and result lists are parameter_lists too
            "parameter_list" if is_field_of_parent(node, "parameters") => NodeKind::ParameterList,
            "parameter_declaration" | "variadic_parameter_declaration" => NodeKind::Parameter,
            "block" => NodeKind::Block,
            "if_statement" | "for_statement" | "expression_case" | "type_case"
            | "communication_case" => NodeKind::Branch,
            "binary_expression" if is_short_circuit(node) => NodeKind::BooleanOperator,
            "short_var_declaration" | "var_declaration" | "const_declaration" => {
                NodeKind::Statement
            }
            kind if kind.ends_with("_statement") => NodeKind::Statement,
            _ => NodeKind::Other,
        }
    }

    fn parameter_type(&self, param: &Node<'_>, source: &[u8]) -> String {
        let ty = param
            .child_by_field_name("type")
            .map(|t| node_text(&t, source))
            .unwrap_or_else(|| "_".to_string());
        if param.kind() == "variadic_parameter_declaration" {
            format!("...{ty}")
        } else {
            ty
        }
    }

    /// Methods are owned by their receiver type.
    fn operation_owner(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        if node.kind() != "method_declaration" {
            return None;
        }
        let receiver = node.child_by_field_name("receiver")?;
        let mut cursor = receiver.walk();
        let param = receiver
            .named_children(&mut cursor)
            .find(|c| c.kind() == "parameter_declaration")?;
        let ty = param.child_by_field_name("type")?;
        Some(receiver_type_name(&node_text(&ty, source)))
    }

    fn module_name(&self, root: &Node<'_>, source: &[u8], path: &Path) -> String {
        self.package_name(root, source)
            .unwrap_or_else(|| file_module_name(path))
    }
}
