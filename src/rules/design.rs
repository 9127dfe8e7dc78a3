//! Size and coupling rules built on [`NodeCountRule`].

use crate::ast::NodeKind;
use crate::rules::node_count::{NodeCountRule, Scoring};

pub const EXCESSIVE_IMPORTS: &str = "ExcessiveImports";
pub const EXCESSIVE_CLASS_LENGTH: &str = "ExcessiveClassLength";
pub const EXCESSIVE_METHOD_COUNT: &str = "ExcessiveMethodCount";
pub const EXCESSIVE_PARAMETER_LIST: &str = "ExcessiveParameterList";

pub fn excessive_imports() -> NodeCountRule {
    NodeCountRule::new(
        EXCESSIVE_IMPORTS,
        "A high number of imports can indicate a high degree of coupling within an object.",
        NodeKind::CompilationUnit,
        Scoring::Only(NodeKind::ImportDeclaration),
        1.0,
    )
}

pub fn excessive_class_length() -> NodeCountRule {
    NodeCountRule::new(
        EXCESSIVE_CLASS_LENGTH,
        "Avoid really long classes.",
        NodeKind::TypeDeclaration,
        Scoring::Span,
        1.0,
    )
}

pub fn excessive_method_count() -> NodeCountRule {
    NodeCountRule::new(
        EXCESSIVE_METHOD_COUNT,
        "This class has too many methods, consider refactoring it.",
        NodeKind::TypeDeclaration,
        Scoring::Only(NodeKind::OperationDeclaration),
        1.0,
    )
}

pub fn excessive_parameter_list() -> NodeCountRule {
    NodeCountRule::new(
        EXCESSIVE_PARAMETER_LIST,
        "Avoid long parameter lists.",
        NodeKind::ParameterList,
        Scoring::Only(NodeKind::Parameter),
        10.0,
    )
}
