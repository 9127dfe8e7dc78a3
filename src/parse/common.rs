use crate::ast::{AstNode, NodeKind, QualifiedName, Span};
use crate::errors::{Result, TallyError};
use crate::parse::ParseFrontend;
use std::collections::HashSet;
use std::path::Path;
use tree_sitter::Node;

/// Text of the child under `field`, if present and valid UTF-8.
pub fn field_text(node: &Node<'_>, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source).ok())
        .map(str::to_string)
}

pub fn node_text(node: &Node<'_>, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().to_string()
}

/// Whether `node` is the child stored under `field` in its parent.
pub fn is_field_of_parent(node: &Node<'_>, field: &str) -> bool {
    node.parent()
        .and_then(|p| p.child_by_field_name(field))
        .is_some_and(|n| n.id() == node.id())
}

/// Whether a binary expression is `&&` or `||`.
pub fn is_short_circuit(node: &Node<'_>) -> bool {
    node.child_by_field_name("operator")
        .is_some_and(|op| matches!(op.kind(), "&&" | "||"))
}

/// Module name derived from the file: its stem, or the directory name for
/// package entry files (`mod.rs`, `__init__.py`).
pub fn file_module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    if matches!(stem, "mod" | "__init__") {
        if let Some(dir) = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        {
            return dir.to_string();
        }
    }
    stem.to_string()
}

fn span_of(node: &Node<'_>) -> Span {
    Span::new(node.start_position().row + 1, node.end_position().row + 1)
}

/// Parse `source` with `frontend` and lower the syntax tree.
pub fn parse_source<F: ParseFrontend + ?Sized>(
    frontend: &F,
    source: &[u8],
    path: &Path,
) -> Result<AstNode> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&frontend.language())
        .map_err(|e| TallyError::Parse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| TallyError::Parse {
        file: path.to_path_buf(),
        message: "parser produced no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!("{} contains syntax errors", path.display());
    }

    let module = frontend.module_name(&root, source, path);
    let mut lowering = Lowering {
        frontend,
        source,
        module,
        scopes: Vec::new(),
        taken: HashSet::new(),
    };
    lowering.lower(root).ok_or_else(|| TallyError::Parse {
        file: path.to_path_buf(),
        message: "empty syntax tree".to_string(),
    })
}

/// A node whose children are still being lowered.
struct Frame<'t> {
    ast: AstNode,
    pending: std::vec::IntoIter<Node<'t>>,
    pushed_scope: bool,
}

/// Converts a tree-sitter tree into an [`AstNode`] tree, assigning qualified
/// names from a stack of enclosing declarations.
///
/// The walk keeps its own stack: expression chains in generated code nest
/// thousands of levels deep.
struct Lowering<'f, F: ParseFrontend + ?Sized> {
    frontend: &'f F,
    source: &'f [u8],
    module: String,
    scopes: Vec<String>,
    /// Qualified names already handed out in this file.
    taken: HashSet<String>,
}

impl<F: ParseFrontend + ?Sized> Lowering<'_, F> {
    fn owner(&self) -> &str {
        self.scopes.last().map_or(self.module.as_str(), String::as_str)
    }

    /// Post-order lowering of `root`; children are attached as they finish.
    fn lower<'t>(&mut self, root: Node<'t>) -> Option<AstNode> {
        let mut stack = vec![self.enter(root)];
        while let Some(mut frame) = stack.pop() {
            if let Some(child) = frame.pending.next() {
                let child = self.enter(child);
                stack.push(frame);
                stack.push(child);
                continue;
            }

            if frame.pushed_scope {
                self.scopes.pop();
            }
            match stack.last_mut() {
                Some(parent) => parent.ast.push_child(frame.ast),
                None => return Some(frame.ast),
            }
        }
        None
    }

    /// Classify and name `node`, opening a naming scope when it owns
    /// declarations.
    fn enter<'t>(&mut self, node: Node<'t>) -> Frame<'t> {
        let kind = self.frontend.classify(&node, self.source);
        let mut ast = AstNode::new(kind, node.kind(), span_of(&node));
        let mut pushed_scope = false;

        match kind {
            NodeKind::TypeDeclaration => {
                let name = self
                    .frontend
                    .declaration_name(&node, self.source)
                    .unwrap_or_else(|| "<anonymous>".to_string());
                let qualified = self.unique(QualifiedName::nested_type(self.owner(), &name));
                self.scopes.push(qualified.to_string());
                pushed_scope = true;
                ast = ast.with_name(name).with_qualified_name(qualified);
            }
            NodeKind::OperationDeclaration => {
                let name = self
                    .frontend
                    .declaration_name(&node, self.source)
                    .unwrap_or_else(|| "<anonymous>".to_string());
                let owner = match self.frontend.operation_owner(&node, self.source) {
                    Some(receiver) => QualifiedName::nested_type(&self.module, &receiver).to_string(),
                    None => self.owner().to_string(),
                };
                let qualified = self.unique(QualifiedName::operation(
                    &owner,
                    &name,
                    &self.parameter_types(&node),
                ));
                self.scopes.push(qualified.to_string());
                pushed_scope = true;
                ast = ast.with_name(name).with_qualified_name(qualified);
            }
            NodeKind::Annotation => {
                if let Some(name) = self.frontend.annotation_name(&node, self.source) {
                    ast = ast.with_name(name);
                }
            }
            _ => {
                if let Some(segment) = self.frontend.scope_segment(&node, self.source) {
                    let scope = self.unique(QualifiedName::nested_type(self.owner(), &segment));
                    self.scopes.push(scope.to_string());
                    pushed_scope = true;
                }
            }
        }

        let mut pending = Vec::new();
        if kind.is_declaration() {
            pending.extend(self.frontend.attached_annotations(&node));
        }
        let mut cursor = node.walk();
        pending.extend(node.named_children(&mut cursor));

        Frame {
            ast,
            pending: pending.into_iter(),
            pushed_scope,
        }
    }

    /// `name`, or `name$1`, `name$2`, ... when a declaration earlier in the
    /// file already uses it.
    fn unique(&mut self, name: QualifiedName) -> QualifiedName {
        if self.taken.insert(name.to_string()) {
            return name;
        }
        let mut ordinal = 1usize;
        loop {
            let candidate = format!("{name}${ordinal}");
            if self.taken.insert(candidate.clone()) {
                return QualifiedName::new(candidate);
            }
            ordinal += 1;
        }
    }

    /// Types of the parameters in the operation's own parameter lists.
    fn parameter_types(&self, op: &Node<'_>) -> Vec<String> {
        let mut types = Vec::new();
        let mut cursor = op.walk();
        for list in op.named_children(&mut cursor) {
            if self.frontend.classify(&list, self.source) != NodeKind::ParameterList {
                continue;
            }
            let mut inner = list.walk();
            for param in list.named_children(&mut inner) {
                if self.frontend.classify(&param, self.source) == NodeKind::Parameter {
                    types.push(self.frontend.parameter_type(&param, self.source));
                }
            }
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::java::JavaFrontend;
    use std::path::PathBuf;

    #[test]
    fn module_name_from_path() {
        assert_eq!(file_module_name(Path::new("src/billing.py")), "billing");
        assert_eq!(file_module_name(Path::new("pkg/orders/__init__.py")), "orders");
        assert_eq!(file_module_name(Path::new("src/ledger/mod.rs")), "ledger");
        assert_eq!(file_module_name(&PathBuf::from("Main.java")), "Main");
    }

    #[test]
    fn deeply_nested_expressions_lower_on_a_small_stack() {
        let operands: Vec<String> = (0..20_000).map(|i| format!("\"s{i}\"")).collect();
        let source = format!("class A {{ String s() {{ return {}; }} }}", operands.join(" + "));

        let nodes = std::thread::Builder::new()
            .stack_size(1024 * 1024)
            .spawn(move || {
                let unit = JavaFrontend::new()
                    .parse(source.as_bytes(), Path::new("A.java"))
                    .unwrap();
                let ops = unit
                    .find_descendants_of_kind(NodeKind::OperationDeclaration)
                    .count();
                (ops, unit.descendants().count())
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(nodes.0, 1);
        assert!(nodes.1 > 20_000);
    }
}
