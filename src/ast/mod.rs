//! Language-independent syntax tree consumed by rules and metrics.
//!
//! Every language frontend lowers its concrete syntax tree into [`AstNode`]s.
//! Rules and metric calculators are written against this tree only, so adding
//! a language never touches the evaluation engine.

pub mod query;

use serde::Serialize;
use std::fmt;

/// Closed classification of syntax nodes the engine understands.
///
/// The grammar's own kind string is kept on each node as `raw_kind`; this enum
/// is what rules and metrics match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a parsed file.
    CompilationUnit,
    ImportDeclaration,
    /// Class, interface, enum, record, struct, trait or impl block.
    TypeDeclaration,
    /// Method, constructor or function.
    OperationDeclaration,
    FieldDeclaration,
    ParameterList,
    Parameter,
    /// Annotation, decorator or attribute attached to a declaration.
    Annotation,
    Block,
    Statement,
    /// A decision point: conditional, loop, case arm, catch clause.
    Branch,
    /// Short-circuiting `&&` / `||` / `and` / `or`.
    BooleanOperator,
    Other,
}

impl NodeKind {
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::TypeDeclaration | NodeKind::OperationDeclaration
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::CompilationUnit => "compilation unit",
            NodeKind::ImportDeclaration => "import declaration",
            NodeKind::TypeDeclaration => "type declaration",
            NodeKind::OperationDeclaration => "operation declaration",
            NodeKind::FieldDeclaration => "field declaration",
            NodeKind::ParameterList => "parameter list",
            NodeKind::Parameter => "parameter",
            NodeKind::Annotation => "annotation",
            NodeKind::Block => "block",
            NodeKind::Statement => "statement",
            NodeKind::Branch => "branch",
            NodeKind::BooleanOperator => "boolean operator",
            NodeKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// 1-indexed, inclusive line span of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub begin_line: usize,
    pub end_line: usize,
}

impl Span {
    pub fn new(begin_line: usize, end_line: usize) -> Self {
        Self {
            begin_line,
            end_line,
        }
    }

    /// `end_line - begin_line`, or 0 for an inverted span.
    pub fn extent(&self) -> usize {
        self.end_line.saturating_sub(self.begin_line)
    }
}

/// Identity of a declaration, e.g. `com.acme.Order` or `com.acme.Order#total(int)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Qualified name of a type nested in `owner` (or top-level in a module).
    pub fn nested_type(owner: &str, name: &str) -> Self {
        if owner.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{owner}.{name}"))
        }
    }

    /// Qualified name of an operation declared in `owner`.
    pub fn operation(owner: &str, name: &str, parameter_types: &[String]) -> Self {
        Self(format!("{owner}#{name}({})", parameter_types.join(",")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node of a parsed source tree.
///
/// Children are owned by their parent in syntactic order, so the tree is
/// acyclic by construction. Nodes are built once by a frontend and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    kind: NodeKind,
    raw_kind: String,
    span: Span,
    name: Option<String>,
    qualified_name: Option<QualifiedName>,
    children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(kind: NodeKind, raw_kind: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            raw_kind: raw_kind.into(),
            span,
            name: None,
            qualified_name: None,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_qualified_name(mut self, qualified_name: QualifiedName) -> Self {
        self.qualified_name = Some(qualified_name);
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push_child(&mut self, child: AstNode) {
        self.children.push(child);
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The grammar-specific kind this node was lowered from.
    pub fn raw_kind(&self) -> &str {
        &self.raw_kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn begin_line(&self) -> usize {
        self.span.begin_line
    }

    pub fn end_line(&self) -> usize {
        self.span.end_line
    }

    /// Simple name of a declaration or annotation, when the frontend found one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Qualified name; only declarations have one.
    pub fn qualified_name(&self) -> Option<&QualifiedName> {
        if self.kind.is_declaration() {
            self.qualified_name.as_ref()
        } else {
            None
        }
    }

    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    pub fn is_declaration(&self) -> bool {
        self.kind.is_declaration()
    }

    /// Pre-order iterator over all descendants (excluding `self`).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self, None)
    }

    /// Pre-order iterator over descendants that yields nodes of kind
    /// `barrier` but does not enter them.
    pub fn descendants_within(&self, barrier: NodeKind) -> Descendants<'_> {
        Descendants::new(self, Some(barrier))
    }

    /// Lazily find every descendant of the given kind. Yields nothing when the
    /// frontend never produces that kind.
    pub fn find_descendants_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &AstNode> {
        self.descendants().filter(move |n| n.kind == kind)
    }

    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &AstNode> {
        self.children.iter().filter(move |n| n.kind == kind)
    }

    pub fn first_child_of_kind(&self, kind: NodeKind) -> Option<&AstNode> {
        self.children_of_kind(kind).next()
    }
}

// Deep trees are released without recursing once per level.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Stack-based pre-order walk. See [`AstNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a AstNode>,
    barrier: Option<NodeKind>,
}

impl<'a> Descendants<'a> {
    fn new(root: &'a AstNode, barrier: Option<NodeKind>) -> Self {
        Self {
            stack: root.children.iter().rev().collect(),
            barrier,
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if self.barrier != Some(node.kind) {
            self.stack.extend(node.children.iter().rev());
        }
        Some(node)
    }
}
