//! Name and type resolution against the lexical context.
//!
//! The walker keeps a scope stack and a registry of in-file record and enum
//! names; this module turns written type spellings into the display texts
//! used by the generated fragments, and builds qualified names (including
//! the `(unnamed … at file:line:col)` form for anonymous aggregates).

use arborium_tree_sitter as tree_sitter;
use indexmap::IndexSet;

use fstrgen_core::{TemplateParam, TemplateParamKind};

/// A member type the synthesiser can print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub text: String,
    /// Set when `text` is the `<{}>` placeholder: the template parameter
    /// whose `typeid(..).name()` fills the slot.
    pub typeid_param: Option<String>,
}

impl ResolvedType {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            typeid_param: None,
        }
    }
}

/// Shapes the synthesiser refuses to print.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("template arguments nested {depth} deep cannot be printed")]
    TooDeep { depth: usize },
}

/// Lexical context for one resolution: template parameters in scope, the
/// set of record/enum names collected from this file, and the scope path
/// used to try qualified candidates innermost-first.
pub struct ResolveCtx<'a> {
    pub source: &'a str,
    pub param_stack: &'a [Vec<TemplateParam>],
    pub known_types: &'a IndexSet<String>,
    /// Plain scope segments (no template suffixes), outermost first.
    pub scope_path: &'a [String],
}

impl<'a> ResolveCtx<'a> {
    fn text(&self, node: tree_sitter::Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    pub fn param_kind(&self, name: &str) -> Option<TemplateParamKind> {
        self.param_stack
            .iter()
            .rev()
            .flat_map(|params| params.iter())
            .find(|p| p.name == name)
            .map(|p| p.kind)
    }

    /// Resolve a written name against the scope chain, innermost scope
    /// first, returning the registry key it denotes.
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        for prefix_len in (0..=self.scope_path.len()).rev() {
            let candidate = if prefix_len == 0 {
                name.to_string()
            } else {
                format!("{}::{}", self.scope_path[..prefix_len].join("::"), name)
            };
            if self.known_types.contains(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Turn a field's type node into display text.
    ///
    /// Builtins, arrays and in-file names keep their spelling; a bare
    /// template-parameter type becomes the `<{}>` slot; anything the file
    /// does not declare falls back to the literal `int`.
    pub fn resolve_type(&self, node: tree_sitter::Node) -> Result<ResolvedType, TypeError> {
        let depth = template_depth(node);
        if depth >= 3 {
            return Err(TypeError::TooDeep { depth });
        }

        match node.kind() {
            "primitive_type" | "sized_type_specifier" | "placeholder_type_specifier" => {
                Ok(ResolvedType::plain(normalize_type_text(self.text(node))))
            }
            "type_identifier" => {
                let name = self.text(node);
                match self.param_kind(name) {
                    Some(TemplateParamKind::Type) => Ok(ResolvedType {
                        text: "<{}>".to_string(),
                        typeid_param: Some(name.to_string()),
                    }),
                    Some(_) => Ok(ResolvedType::plain(name)),
                    None => {
                        if self.resolve_name(name).is_some() {
                            Ok(ResolvedType::plain(name))
                        } else {
                            Ok(ResolvedType::plain("int"))
                        }
                    }
                }
            }
            "template_type" => {
                let head = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or_default();
                let known_head = self.param_kind(head).is_some()
                    || self.resolve_name(head).is_some();
                if known_head {
                    Ok(ResolvedType::plain(normalize_type_text(self.text(node))))
                } else {
                    Ok(ResolvedType::plain("int"))
                }
            }
            "qualified_identifier" => {
                let text = normalize_type_text(self.text(node));
                let path_only: String = match text.find('<') {
                    Some(idx) => text[..idx].to_string(),
                    None => text.clone(),
                };
                if self.resolve_name(&path_only).is_some() {
                    Ok(ResolvedType::plain(text))
                } else {
                    Ok(ResolvedType::plain("int"))
                }
            }
            "struct_specifier" | "class_specifier" | "union_specifier" | "enum_specifier" => {
                let keyword = match node.kind() {
                    "struct_specifier" => "struct",
                    "class_specifier" => "class",
                    "union_specifier" => "union",
                    _ => "enum",
                };
                match node.child_by_field_name("name") {
                    Some(name) => Ok(ResolvedType::plain(format!(
                        "{keyword} {}",
                        normalize_type_text(self.text(name))
                    ))),
                    None => Ok(ResolvedType::plain("int")),
                }
            }
            _ => Ok(ResolvedType::plain("int")),
        }
    }
}

/// Deepest template-argument nesting anywhere under `node`.
pub fn template_depth(node: tree_sitter::Node) -> usize {
    fn rec(node: tree_sitter::Node, level: usize, max: &mut usize) {
        let level = if node.kind() == "template_argument_list" {
            level + 1
        } else {
            level
        };
        if level > *max {
            *max = level;
        }
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                rec(cursor.node(), level, max);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }

    let mut max = 0;
    rec(node, 0, &mut max);
    max
}

/// Collapse a written type spelling to its canonical display form:
/// whitespace runs become a single space, kept only between word
/// characters; commas are followed by exactly one space.
pub fn normalize_type_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev_word = out
                .chars()
                .last()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
            if prev_word && (ch.is_alphanumeric() || ch == '_') {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
        if ch == ',' {
            out.push(' ');
        }
    }
    out
}

/// Display form of an anonymous aggregate, keyed by its source location.
/// Line and column are one-based input-file coordinates.
pub fn anonymous_name(keyword: &str, file: &str, line: usize, col: usize) -> String {
    format!("(unnamed {keyword} at {file}:{line}:{col})")
}
