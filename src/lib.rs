//! Rule and metrics engine over language-neutral syntax trees.
//!
//! Frontends in [`parse`] lower tree-sitter trees into [`ast::AstNode`]s.
//! [`rules`] evaluates node-counting and metric rules over them, and
//! [`metrics`] computes memoized per-declaration metrics.

pub mod ast;
pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod output;
pub mod parse;
pub mod report;
pub mod rules;
pub mod walk;
