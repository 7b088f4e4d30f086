//! Shared helpers for compiler tests.

use arborium_tree_sitter as tree_sitter;

use crate::frontend::{CppFrontend, ParseOptions};

/// Parse a fixture, panicking on syntax errors.
pub fn parse(source: &str) -> tree_sitter::Tree {
    let unit = CppFrontend::new().parse(source, ParseOptions::default());
    assert!(
        unit.is_valid(),
        "fixture must parse cleanly:\n{}",
        unit.diagnostics.printer().render()
    );
    unit.tree
}

/// First node of the given kind, depth-first.
pub fn find_kind<'t>(node: tree_sitter::Node<'t>, kind: &str) -> Option<tree_sitter::Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            if let Some(found) = find_kind(cursor.node(), kind) {
                return Some(found);
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    None
}
