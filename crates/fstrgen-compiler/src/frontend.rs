//! Tree-sitter C++ front-end driver.
//!
//! The front-end is purely syntactic: headers are never expanded, so every
//! declaration in the tree comes from the primary file by construction.
//! Compiler-style flags from the CLI are carried in [`ParseOptions`] for
//! interface compatibility and recorded on the parse result.

use arborium_tree_sitter as tree_sitter;

use crate::diagnostics::Diagnostics;

/// Compiler-style arguments accepted alongside an input file.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// `-I` include directories.
    pub include_dirs: Vec<String>,
    /// `-D` macro definitions.
    pub defines: Vec<String>,
    /// `-std=` language standard.
    pub std: Option<String>,
}

/// A parsed translation unit.
pub struct ParsedUnit {
    pub tree: tree_sitter::Tree,
    /// Fatal syntax diagnostics; non-empty means the unit must be skipped.
    pub diagnostics: Diagnostics,
    pub options: ParseOptions,
}

impl ParsedUnit {
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// The C++ front-end. Cheap to construct, one per runner.
#[derive(Debug, Default)]
pub struct CppFrontend {
    _private: (),
}

impl CppFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one translation unit.
    ///
    /// `ERROR` and missing nodes are collected as fatal diagnostics with
    /// their byte ranges; the caller decides whether to walk the tree.
    pub fn parse(&self, source: &str, options: ParseOptions) -> ParsedUnit {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&arborium_cpp::language().into())
            .expect("C++ grammar version mismatch");
        let tree = parser
            .parse(source, None)
            .expect("parser yielded no tree without a cancellation flag");

        let mut diagnostics = Diagnostics::new();
        if tree.root_node().has_error() {
            collect_syntax_errors(tree.root_node(), &mut diagnostics);
        }

        ParsedUnit {
            tree,
            diagnostics,
            options,
        }
    }
}

fn collect_syntax_errors(node: tree_sitter::Node, diagnostics: &mut Diagnostics) {
    if node.is_error() {
        diagnostics.error("syntax error", node.start_byte()..node.end_byte());
        return;
    }
    if node.is_missing() {
        diagnostics.error(
            format!("missing {}", node.kind()),
            node.start_byte()..node.end_byte(),
        );
        return;
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            collect_syntax_errors(cursor.node(), diagnostics);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}
