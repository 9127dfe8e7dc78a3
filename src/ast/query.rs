use crate::ast::{AstNode, NodeKind};

const TEST_MARKERS: &[&str] = &["Test", "test", "isTest", "pytest", "tokio::test"];

/// Whether any descendant of `node` has the given kind.
pub fn contains_kind(node: &AstNode, kind: NodeKind) -> bool {
    node.find_descendants_of_kind(kind).next().is_some()
}

/// Whether any descendant of `node` has one of the given kinds.
pub fn contains_any_kind(node: &AstNode, kinds: &[NodeKind]) -> bool {
    node.descendants().any(|n| kinds.contains(&n.kind()))
}

/// Heuristic test detection for a declaration: a test-style name, or a
/// directly attached test annotation (`@Test`, `#[test]`, `@isTest`).
pub fn is_test_declaration(node: &AstNode) -> bool {
    if !node.is_declaration() {
        return false;
    }

    let named_like_test = node.name().is_some_and(|name| {
        name.ends_with("Test") || name.ends_with("Tests") || name.starts_with("test")
    });
    if named_like_test {
        return true;
    }

    // Java keeps annotations inside a `modifiers` wrapper lowered as Other.
    let wrapped = node
        .children_of_kind(NodeKind::Other)
        .flat_map(|c| c.children_of_kind(NodeKind::Annotation));

    node.children_of_kind(NodeKind::Annotation)
        .chain(wrapped)
        .filter_map(|a| a.name())
        .any(|name| {
            let bare = name.trim_start_matches(['@', '#']);
            TEST_MARKERS
                .iter()
                .any(|marker| bare.eq_ignore_ascii_case(marker))
        })
}
