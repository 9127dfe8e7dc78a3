use crate::ast::NodeKind;
use crate::parse::common::{field_text, is_short_circuit, node_text};
use crate::parse::ParseFrontend;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::Node;

pub struct JavaFrontend;

impl JavaFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Package declared by the compilation unit, if any.
    fn package_name(&self, root: &Node<'_>, source: &[u8]) -> Option<String> {
        let lang = self.language();
        let query_str = r#"(package_declaration [(identifier) (scoped_identifier)] @package)"#;
        let query = match tree_sitter::Query::new(&lang, query_str) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!("failed to compile Java package query: {e}");
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

impl Default for JavaFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseFrontend for JavaFrontend {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }

    fn classify(&self, node: &Node<'_>, _source: &[u8]) -> NodeKind {
        match node.kind() {
            "program" => NodeKind::CompilationUnit,
            "import_declaration" => NodeKind::ImportDeclaration,
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration" => NodeKind::TypeDeclaration,
            "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => {
                NodeKind::OperationDeclaration
            }
            "field_declaration" | "constant_declaration" => NodeKind::FieldDeclaration,
            "formal_parameters" => NodeKind::ParameterList,
            "formal_parameter" | "spread_parameter" => NodeKind::Parameter,
            "marker_annotation" | "annotation" => NodeKind::Annotation,
            "block" | "constructor_body" | "switch_block" => NodeKind::Block,
            "if_statement"
            | "for_statement"
            | "enhanced_for_statement"
            | "while_statement"
            | "do_statement"
            | "catch_clause"
            | "ternary_expression" => NodeKind::Branch,
            // `case x:` has a value, `default:` does not
            "switch_label" if node.named_child_count() > 0 => NodeKind::Branch,
            "binary_expression" if is_short_circuit(node) => NodeKind::BooleanOperator,
            "local_variable_declaration" | "explicit_constructor_invocation" => NodeKind::Statement,
            kind if kind.ends_with("_statement") => NodeKind::Statement,
            _ => NodeKind::Other,
        }
    }

    fn parameter_type(&self, param: &Node<'_>, source: &[u8]) -> String {
        if let Some(ty) = param.child_by_field_name("type") {
            return node_text(&ty, source);
        }
        // spread_parameter has no `type` field: `String... args`
        let mut cursor = param.walk();
        let ty = param
            .named_children(&mut cursor)
            .find(|c| c.kind() != "modifiers" && c.kind() != "variable_declarator")
            .map(|c| node_text(&c, source))
            .unwrap_or_else(|| "_".to_string());
        format!("{ty}...")
    }

    /// Enum constant bodies are scoped by the constant (`Op.CLAMP`), anonymous
    /// class bodies by the instantiated type (`Jobs#run().new Runnable`).
    fn scope_segment(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        match node.kind() {
            "enum_constant" if node.child_by_field_name("body").is_some() => {
                field_text(node, "name", source)
            }
            "class_body" => {
                let creation = node
                    .parent()
                    .filter(|p| p.kind() == "object_creation_expression")?;
                let ty = field_text(&creation, "type", source)?;
                Some(format!("new {ty}"))
            }
            _ => None,
        }
    }

    fn module_name(&self, root: &Node<'_>, source: &[u8], _path: &Path) -> String {
        self.package_name(root, source).unwrap_or_default()
    }
}
