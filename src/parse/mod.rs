pub mod common;
pub mod factory;
pub mod go;
pub mod java;
pub mod python;
pub mod rust;

use crate::ast::{AstNode, NodeKind};
use crate::errors::Result;
use std::path::Path;
use tree_sitter::Node;

/// Parser frontend trait: each language implements this to lower its
/// concrete syntax tree into [`AstNode`]s.
pub trait ParseFrontend: Send + Sync {
    /// Return the tree-sitter Language for this frontend.
    fn language(&self) -> tree_sitter::Language;

    /// Map a grammar node onto the engine's node kinds.
    fn classify(&self, node: &Node<'_>, source: &[u8]) -> NodeKind;

    /// Simple name of a type or operation declaration.
    fn declaration_name(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        common::field_text(node, "name", source)
    }

    /// Name of an annotation, decorator or attribute.
    fn annotation_name(&self, node: &Node<'_>, source: &[u8]) -> Option<String> {
        common::field_text(node, "name", source)
    }

    /// Type of one parameter as it appears in qualified operation names.
    fn parameter_type(&self, param: &Node<'_>, source: &[u8]) -> String {
        common::field_text(param, "type", source).unwrap_or_else(|| "_".to_string())
    }

    /// Owner of an operation declared outside any type body (Go methods).
    fn operation_owner(&self, _node: &Node<'_>, _source: &[u8]) -> Option<String> {
        None
    }

    /// Name segment for a node that is not a declaration but owns declarations,
    /// such as a Java enum constant with a body.
    fn scope_segment(&self, _node: &Node<'_>, _source: &[u8]) -> Option<String> {
        None
    }

    /// Annotations that belong to `node` but sit outside it in the grammar.
    fn attached_annotations<'t>(&self, _node: &Node<'t>) -> Vec<Node<'t>> {
        Vec::new()
    }

    /// Prefix for qualified names of everything declared in the file.
    fn module_name(&self, _root: &Node<'_>, _source: &[u8], path: &Path) -> String {
        common::file_module_name(path)
    }

    /// Parse and lower one file.
    fn parse(&self, source: &[u8], path: &Path) -> Result<AstNode> {
        common::parse_source(self, source, path)
    }
}
