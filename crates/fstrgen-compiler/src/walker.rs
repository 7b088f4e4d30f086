//! Declaration walker: depth-first descent over the C++ tree producing the
//! stream of declaration records in source order.
//!
//! Only definitions from the primary file are visible (the front-end never
//! expands headers). Function bodies are not entered, so local classes are
//! never emitted. Declarations carrying a generated marker are skipped,
//! which makes a second run over rewritten output the identity.

use std::collections::HashSet;

use arborium_tree_sitter as tree_sitter;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use fstrgen_core::{
    Access, Decl, EnumDecl, EnumRepr, Enumerator, MemberOrigin, MemberSpec, RecordDecl, RecordKind,
    TemplateParam, TemplateParamKind,
};

use crate::diagnostics::Diagnostics;
use crate::eval::{self, EvalError};
use crate::resolve::{self, ResolveCtx, TypeError};

/// Marker prefix emitted above every generated record member.
pub const RECORD_MARKER: &str = "// Generated to_string for";
/// Marker prefix emitted above every generated enum formatter.
pub const ENUM_MARKER: &str = "// Generated formatter for";

/// Result of walking one translation unit.
#[derive(Debug)]
pub struct WalkOutput {
    pub decls: Vec<Decl>,
    pub diagnostics: Diagnostics,
}

/// Walk the tree of one translation unit.
pub fn walk(tree: &tree_sitter::Tree, source: &str, file: &str) -> WalkOutput {
    let mut walker = Walker {
        source,
        file,
        decls: Vec::new(),
        diagnostics: Diagnostics::new(),
        registry: IndexMap::new(),
        known_types: IndexSet::new(),
        generated_enums: HashSet::new(),
        scopes: Vec::new(),
        param_stack: Vec::new(),
    };
    walker.collect_enum_markers(tree.root_node());

    let root = tree.root_node();
    let ctx = Ctx {
        top_level_end: root.end_byte(),
        record_stmt_end: None,
    };
    walker.walk_scope(root, ctx, true);

    WalkOutput {
        decls: walker.decls,
        diagnostics: walker.diagnostics,
    }
}

/// Positional context threaded through the descent, used to compute enum
/// hoist targets.
#[derive(Debug, Clone, Copy)]
struct Ctx {
    /// End byte of the current top-level item (child of the translation
    /// unit); private nested enum formatters land after its closing line.
    top_level_end: usize,
    /// End byte of the outermost enclosing record statement, set when the
    /// walk crosses from namespace scope into a record.
    record_stmt_end: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Namespace,
    Record,
}

#[derive(Debug, Clone)]
struct Scope {
    kind: ScopeKind,
    /// Display segment used in qualified names (`Outer`, `Map<K, T>`,
    /// `(unnamed struct at f.cpp:40:3)`).
    display: String,
    /// Plain segment used for registry keys (`Outer`, `Map`).
    plain: String,
    /// For records: access of the record itself at its declaration.
    access: Access,
    /// For records: whether this is a template primary.
    template: bool,
}

/// What later declarations need to know about an already-walked record.
#[derive(Debug, Clone, Default)]
struct RecordInfo {
    display: String,
    own_members: Vec<MemberSpec>,
    bases: Vec<BaseClause>,
}

#[derive(Debug, Clone)]
struct BaseClause {
    /// Registry key the base head resolved to, if it is declared in this
    /// file.
    resolved: Option<String>,
    /// False when the base is a concrete template instantiation whose
    /// members the walker cannot reach: only what is reachable gets
    /// emitted, never a guess.
    reachable: bool,
}

/// Whether a record walk emits a declaration record or only collects
/// members (anonymous aggregate fields are collect-only: their members are
/// promoted into the parent instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitMode {
    Emit,
    CollectOnly,
}

struct Walker<'s> {
    source: &'s str,
    file: &'s str,
    decls: Vec<Decl>,
    diagnostics: Diagnostics,
    registry: IndexMap<String, RecordInfo>,
    known_types: IndexSet<String>,
    generated_enums: HashSet<String>,
    scopes: Vec<Scope>,
    param_stack: Vec<Vec<TemplateParam>>,
}

impl<'s> Walker<'s> {
    fn text(&self, node: tree_sitter::Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    fn children<'t>(node: tree_sitter::Node<'t>) -> Vec<tree_sitter::Node<'t>> {
        let mut cursor = node.walk();
        let mut out = Vec::new();
        if cursor.goto_first_child() {
            loop {
                out.push(cursor.node());
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        out
    }

    fn field_children<'t>(node: tree_sitter::Node<'t>, field: &str) -> Vec<tree_sitter::Node<'t>> {
        let mut cursor = node.walk();
        let mut out = Vec::new();
        if cursor.goto_first_child() {
            loop {
                if cursor.field_name() == Some(field) {
                    out.push(cursor.node());
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        out
    }

    fn scope_plains(&self) -> Vec<String> {
        self.scopes.iter().map(|s| s.plain.clone()).collect()
    }

    fn display_path(&self, last: &str) -> String {
        let mut parts: Vec<&str> = self.scopes.iter().map(|s| s.display.as_str()).collect();
        parts.push(last);
        parts.join("::")
    }

    fn key_path(&self, last: &str) -> String {
        let mut parts: Vec<&str> = self.scopes.iter().map(|s| s.plain.as_str()).collect();
        parts.push(last);
        parts.join("::")
    }

    /// Resolve a written (possibly qualified) name against the current
    /// scope chain, innermost first.
    fn resolve_known(&self, name: &str) -> Option<String> {
        let plains = self.scope_plains();
        for prefix_len in (0..=plains.len()).rev() {
            let candidate = if prefix_len == 0 {
                name.to_string()
            } else {
                format!("{}::{}", plains[..prefix_len].join("::"), name)
            };
            if self.known_types.contains(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn collect_enum_markers(&mut self, node: tree_sitter::Node) {
        if node.kind() == "comment" {
            let text = self.text(node);
            if let Some(rest) = text.strip_prefix(ENUM_MARKER) {
                if let Some(pos) = rest.find(" enum ") {
                    let tail = &rest[pos + " enum ".len()..];
                    if let Some(end) = tail.find(" of type") {
                        self.generated_enums.insert(tail[..end].to_string());
                    }
                }
            }
            return;
        }
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                self.collect_enum_markers(cursor.node());
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }

    /// Walk the children of a translation unit or namespace body.
    fn walk_scope(&mut self, list: tree_sitter::Node, mut ctx: Ctx, top_level: bool) {
        for child in Self::children(list) {
            if top_level {
                ctx.top_level_end = child.end_byte();
            }
            self.walk_scope_item(child, ctx);
        }
    }

    fn walk_scope_item(&mut self, node: tree_sitter::Node, ctx: Ctx) {
        let stmt_end = node.end_byte();
        match node.kind() {
            "namespace_definition" => self.walk_namespace(node, ctx),
            "struct_specifier" | "class_specifier" | "union_specifier" => {
                if node.child_by_field_name("body").is_some() {
                    let ctx = Ctx {
                        record_stmt_end: Some(ctx.record_stmt_end.unwrap_or(stmt_end)),
                        ..ctx
                    };
                    self.walk_record(node, &[], Access::Invalid, None, ctx, EmitMode::Emit);
                }
            }
            "enum_specifier" => {
                self.walk_enum(node, Access::Invalid, stmt_end, ctx);
            }
            "declaration" => {
                let Some(type_node) = node.child_by_field_name("type") else {
                    return;
                };
                let declarators = Self::field_children(node, "declarator");
                match type_node.kind() {
                    "struct_specifier" | "class_specifier" | "union_specifier"
                        if type_node.child_by_field_name("body").is_some() =>
                    {
                        let ctx = Ctx {
                            record_stmt_end: Some(ctx.record_stmt_end.unwrap_or(stmt_end)),
                            ..ctx
                        };
                        self.walk_record(
                            type_node,
                            &declarators,
                            Access::Invalid,
                            None,
                            ctx,
                            EmitMode::Emit,
                        );
                    }
                    "enum_specifier" => {
                        self.walk_enum(type_node, Access::Invalid, stmt_end, ctx);
                    }
                    _ => {}
                }
            }
            "template_declaration" => {
                self.walk_template(node, Access::Invalid, stmt_end, ctx);
            }
            // Function bodies are never entered: local classes stay
            // unprinted.
            _ => {}
        }
    }

    fn walk_namespace(&mut self, node: tree_sitter::Node, ctx: Ctx) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let mut pushed = 0;
        if let Some(name) = node.child_by_field_name("name") {
            for segment in self.text(name).split("::") {
                let segment = segment.trim();
                if segment.is_empty() {
                    continue;
                }
                self.scopes.push(Scope {
                    kind: ScopeKind::Namespace,
                    display: segment.to_string(),
                    plain: segment.to_string(),
                    access: Access::Invalid,
                    template: false,
                });
                pushed += 1;
            }
        }
        self.walk_scope(body, ctx, false);
        for _ in 0..pushed {
            self.scopes.pop();
        }
    }

    fn walk_template(&mut self, node: tree_sitter::Node, access: Access, stmt_end: usize, ctx: Ctx) {
        let params = node
            .child_by_field_name("parameters")
            .or_else(|| {
                Self::children(node)
                    .into_iter()
                    .find(|c| c.kind() == "template_parameter_list")
            })
            .map(|p| self.template_params(p))
            .unwrap_or_default();

        // Alias, variable and function templates carry no members; only a
        // record definition under the template is walked.
        let target = Self::children(node).into_iter().find(|c| {
            matches!(
                c.kind(),
                "struct_specifier" | "class_specifier" | "union_specifier"
            ) && c.child_by_field_name("body").is_some()
        });
        if let Some(child) = target {
            let ctx = Ctx {
                record_stmt_end: Some(ctx.record_stmt_end.unwrap_or(stmt_end)),
                ..ctx
            };
            self.walk_record(child, &[], access, Some(params), ctx, EmitMode::Emit);
        }
    }

    fn template_params(&self, list: tree_sitter::Node) -> Vec<TemplateParam> {
        let mut params = Vec::new();
        for child in Self::children(list) {
            let param = match child.kind() {
                "type_parameter_declaration" | "optional_type_parameter_declaration" => self
                    .param_name(child)
                    .map(|name| TemplateParam {
                        kind: TemplateParamKind::Type,
                        name,
                    }),
                "variadic_type_parameter_declaration" => self.param_name(child).map(|name| {
                    TemplateParam {
                        kind: TemplateParamKind::Type,
                        name,
                    }
                }),
                "template_template_parameter_declaration" => {
                    // The declared name sits in the trailing `typename C`
                    // part, after the nested parameter list.
                    let inner = Self::children(child)
                        .into_iter()
                        .filter(|c| {
                            matches!(
                                c.kind(),
                                "type_parameter_declaration"
                                    | "optional_type_parameter_declaration"
                            )
                        })
                        .next_back();
                    inner.and_then(|c| self.param_name(c)).map(|name| TemplateParam {
                        kind: TemplateParamKind::Template,
                        name,
                    })
                }
                "parameter_declaration" | "optional_parameter_declaration" => {
                    let declarator = Self::field_children(child, "declarator")
                        .into_iter()
                        .next()
                        .and_then(|d| self.declarator_parts(d));
                    declarator.map(|(name, _, _)| TemplateParam {
                        kind: TemplateParamKind::NonType,
                        name,
                    })
                }
                _ => None,
            };
            params.extend(param);
        }
        params
    }

    fn param_name(&self, decl: tree_sitter::Node) -> Option<String> {
        // The declared name is the first type identifier; a default
        // argument may contribute another one after `=`.
        Self::children(decl)
            .into_iter()
            .find(|c| c.kind() == "type_identifier")
            .map(|c| self.text(c).to_string())
    }

    /// Walk a record definition. Returns the own-member list so anonymous
    /// aggregate fields can be promoted by the caller.
    #[allow(clippy::too_many_arguments)]
    fn walk_record(
        &mut self,
        node: tree_sitter::Node,
        instance_declarators: &[tree_sitter::Node],
        access: Access,
        params: Option<Vec<TemplateParam>>,
        ctx: Ctx,
        emit: EmitMode,
    ) -> Vec<MemberSpec> {
        let Some(body) = node.child_by_field_name("body") else {
            return Vec::new();
        };

        let kind = match node.kind() {
            "class_specifier" => RecordKind::Class,
            "union_specifier" => RecordKind::Union,
            _ => RecordKind::Struct,
        };
        let keyword = match kind {
            RecordKind::Struct => "struct",
            RecordKind::Class => "class",
            RecordKind::Union => "union",
        };

        let params = params.unwrap_or_default();
        let is_template_primary = !params.is_empty();

        // Name segments: display carries template placeholders and the
        // anonymous location marker; plain is the registry key segment.
        let (display_seg, plain_seg, anonymous) = match node.child_by_field_name("name") {
            Some(name) if name.kind() == "template_type" => {
                let text = resolve::normalize_type_text(self.text(name));
                (text.clone(), text, false)
            }
            Some(name) => {
                let base = self.text(name).to_string();
                if is_template_primary {
                    let args: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                    (format!("{base}<{}>", args.join(", ")), base, false)
                } else {
                    (base.clone(), base, false)
                }
            }
            None => {
                let pos = node.start_position();
                let marker =
                    resolve::anonymous_name(keyword, self.file, pos.row + 1, pos.column + 1);
                (marker.clone(), marker, true)
            }
        };

        let qualified = self.display_path(&display_seg);
        let key = self.key_path(&plain_seg);

        // Self-referential member types and CRTP bases must resolve.
        if !anonymous {
            self.known_types.insert(key.clone());
            self.registry.insert(
                key.clone(),
                RecordInfo {
                    display: qualified.clone(),
                    ..RecordInfo::default()
                },
            );
        }

        // A marker among the body's direct children means this record was
        // already rewritten; walk it for the registry but emit nothing.
        let already_generated = Self::children(body).iter().any(|c| {
            c.kind() == "comment" && self.text(*c).starts_with(RECORD_MARKER)
        });

        let bases = self.base_clauses(node, &plain_seg, &params);

        self.scopes.push(Scope {
            kind: ScopeKind::Record,
            display: display_seg.clone(),
            plain: plain_seg.clone(),
            access,
            template: is_template_primary,
        });
        self.param_stack.push(params.clone());
        let own_members = self.walk_record_body(body, kind, ctx);
        self.param_stack.pop();
        self.scopes.pop();

        if !anonymous {
            let info = RecordInfo {
                display: qualified.clone(),
                own_members: own_members.clone(),
                bases: bases.clone(),
            };
            self.registry.insert(key.clone(), info);
        }

        // An anonymous record that is a field of another record contributes
        // no declaration of its own; its members are promoted upward. At
        // namespace scope it is still formattable through its instance.
        let parent_is_record = self
            .scopes
            .last()
            .is_some_and(|s| s.kind == ScopeKind::Record);
        if emit == EmitMode::CollectOnly || (anonymous && parent_is_record) {
            return own_members;
        }
        if anonymous && instance_declarators.is_empty() {
            return own_members;
        }
        if already_generated {
            debug!(record = %qualified, "marker present, skipping");
            return own_members;
        }

        let mut members = own_members.clone();
        let mut seen: HashSet<String> = members.iter().map(|m| m.name.clone()).collect();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(key.clone());
        self.inherit_members(&bases, &mut members, &mut seen, &mut visited);

        self.decls.push(Decl::Record(RecordDecl {
            name: qualified,
            kind,
            access,
            is_template_primary,
            params,
            members,
            insert_at: body.end_byte() - 1,
            depth: self.scopes.len() + 1,
        }));
        own_members
    }

    /// Parse the base-class clause, resolving each base against the file's
    /// registry and deciding member reachability.
    fn base_clauses(
        &mut self,
        node: tree_sitter::Node,
        own_name: &str,
        params: &[TemplateParam],
    ) -> Vec<BaseClause> {
        let Some(clause) = Self::children(node)
            .into_iter()
            .find(|c| c.kind() == "base_class_clause")
        else {
            return Vec::new();
        };

        let mut bases = Vec::new();
        for base in Self::children(clause) {
            if !matches!(
                base.kind(),
                "type_identifier" | "template_type" | "qualified_identifier"
            ) {
                continue;
            }
            let text = resolve::normalize_type_text(self.text(base));
            let (head, args) = split_template_name(&text);
            let resolved = self.resolve_known(&head);
            if resolved.is_none() {
                debug!(base = %text, "base not declared in this file, members unavailable");
            }

            // Dependent bases (arguments naming a template parameter) and
            // self-referential CRTP bases resolve against the primary; a
            // concrete foreign instantiation loses its members.
            let reachable = args.is_empty()
                || args
                    .iter()
                    .any(|a| a == own_name || params.iter().any(|p| p.name == *a));
            if resolved.is_some() && !reachable {
                self.diagnostics.warning(
                    format!("members of template base `{text}` are not reachable and will not be printed"),
                    base.start_byte()..base.end_byte(),
                );
            }

            bases.push(BaseClause { resolved, reachable });
        }
        bases
    }

    /// Inline accessible base members, preorder and left to right, with
    /// name-duplicate suppression (first occurrence wins).
    fn inherit_members(
        &self,
        bases: &[BaseClause],
        members: &mut Vec<MemberSpec>,
        seen: &mut HashSet<String>,
        visited: &mut HashSet<String>,
    ) {
        for base in bases {
            let Some(key) = base.resolved.as_ref() else {
                continue;
            };
            if !base.reachable || !visited.insert(key.clone()) {
                continue;
            }
            let Some(info) = self.registry.get(key) else {
                continue;
            };
            for member in &info.own_members {
                if !seen.insert(member.name.clone()) {
                    continue;
                }
                members.push(MemberSpec {
                    type_text: member.type_text.clone(),
                    name: member.name.clone(),
                    origin: MemberOrigin::Inherited {
                        base: info.display.clone(),
                    },
                    typeid_param: member.typeid_param.clone(),
                });
            }
            self.inherit_members(&info.bases, members, seen, visited);
        }
    }

    /// Walk a record body: track access labels, collect own members, and
    /// recurse into nested declarations.
    fn walk_record_body(
        &mut self,
        body: tree_sitter::Node,
        kind: RecordKind,
        ctx: Ctx,
    ) -> Vec<MemberSpec> {
        let mut access = match kind {
            RecordKind::Class => Access::Private,
            RecordKind::Struct | RecordKind::Union => Access::Public,
        };
        let mut members = Vec::new();

        for child in Self::children(body) {
            match child.kind() {
                "access_specifier" => {
                    access = match self.text(child).trim_end_matches(':').trim() {
                        "public" => Access::Public,
                        "protected" => Access::Protected,
                        _ => Access::Private,
                    };
                }
                "field_declaration" => {
                    self.walk_field(child, access, ctx, &mut members);
                }
                "struct_specifier" | "class_specifier" | "union_specifier" => {
                    if child.child_by_field_name("body").is_some() {
                        let inner = self.walk_record(child, &[], access, None, ctx, EmitMode::Emit);
                        // An instanceless anonymous aggregate injects its
                        // fields directly into the enclosing record.
                        if child.child_by_field_name("name").is_none() {
                            members.extend(inner);
                        }
                    }
                }
                "enum_specifier" => {
                    self.walk_enum(child, access, child.end_byte(), ctx);
                }
                "template_declaration" => {
                    self.walk_template(child, access, child.end_byte(), ctx);
                }
                // Methods, friends, usings and nested function definitions
                // carry no data members.
                _ => {}
            }
        }
        members
    }

    /// One `field_declaration`: either an ordinary data member (possibly
    /// several declarators), a nested record or enum definition, or an
    /// anonymous aggregate whose fields promote upward.
    fn walk_field(
        &mut self,
        node: tree_sitter::Node,
        access: Access,
        ctx: Ctx,
        members: &mut Vec<MemberSpec>,
    ) {
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        let declarators = Self::field_children(node, "declarator");

        match type_node.kind() {
            "struct_specifier" | "class_specifier" | "union_specifier"
                if type_node.child_by_field_name("body").is_some() =>
            {
                if let Some(name_node) = type_node.child_by_field_name("name") {
                    self.walk_record(type_node, &[], access, None, ctx, EmitMode::Emit);
                    let keyword = match type_node.kind() {
                        "class_specifier" => "class",
                        "union_specifier" => "union",
                        _ => "struct",
                    };
                    let name_text = self.text(name_node);
                    for declarator in &declarators {
                        if let Some((name, pointers, suffix)) = self.declarator_parts(*declarator)
                        {
                            members.push(MemberSpec::own(
                                format!("{keyword} {name_text}{pointers}{suffix}"),
                                name,
                            ));
                        }
                    }
                } else {
                    // Anonymous aggregate field: no declaration record of
                    // its own, fields promoted through the accessor.
                    let inner =
                        self.walk_record(type_node, &[], access, None, ctx, EmitMode::CollectOnly);
                    if declarators.is_empty() {
                        members.extend(inner);
                    } else {
                        for declarator in &declarators {
                            let Some((accessor, _, _)) = self.declarator_parts(*declarator)
                            else {
                                continue;
                            };
                            for member in &inner {
                                members.push(MemberSpec {
                                    type_text: member.type_text.clone(),
                                    name: format!("{accessor}.{}", member.name),
                                    origin: MemberOrigin::Promoted {
                                        via: accessor.clone(),
                                    },
                                    typeid_param: member.typeid_param.clone(),
                                });
                            }
                        }
                    }
                }
            }
            "enum_specifier" if type_node.child_by_field_name("body").is_some() => {
                self.walk_enum(type_node, access, node.end_byte(), ctx);
                if let Some(name) = type_node.child_by_field_name("name") {
                    let name_text = self.text(name).to_string();
                    for declarator in &declarators {
                        if let Some((member, pointers, suffix)) = self.declarator_parts(*declarator)
                        {
                            members.push(MemberSpec::own(
                                format!("enum {name_text}{pointers}{suffix}"),
                                member,
                            ));
                        }
                    }
                }
            }
            _ => {
                let plains = self.scope_plains();
                let resolve_ctx = ResolveCtx {
                    source: self.source,
                    param_stack: &self.param_stack,
                    known_types: &self.known_types,
                    scope_path: &plains,
                };
                let resolved = match resolve_ctx.resolve_type(type_node) {
                    Ok(resolved) => resolved,
                    Err(TypeError::TooDeep { .. }) => {
                        self.diagnostics.warning(
                            format!(
                                "member type `{}` cannot be printed and will be skipped",
                                resolve::normalize_type_text(self.text(type_node))
                            ),
                            node.start_byte()..node.end_byte(),
                        );
                        return;
                    }
                };
                for declarator in &declarators {
                    let Some((name, pointers, suffix)) = self.declarator_parts(*declarator) else {
                        continue;
                    };
                    let bare = pointers.is_empty() && suffix.is_empty();
                    // A decorated parameter type (`T*`, `T[4]`) keeps the
                    // parameter spelling; the `<{}>` slot is only valid on
                    // its own.
                    let base_text = match (&resolved.typeid_param, bare) {
                        (Some(param), false) => param.clone(),
                        _ => resolved.text.clone(),
                    };
                    let mut member =
                        MemberSpec::own(format!("{base_text}{pointers}{suffix}"), name);
                    if bare {
                        member.typeid_param = resolved.typeid_param.clone();
                    }
                    members.push(member);
                }
            }
        }
    }

    /// Drill through a declarator to its spelled name, collecting pointer
    /// and array decorations. Returns `None` for function declarators
    /// (methods are not data members).
    fn declarator_parts(&self, node: tree_sitter::Node) -> Option<(String, String, String)> {
        match node.kind() {
            "field_identifier" | "identifier" => Some((self.text(node).to_string(), String::new(), String::new())),
            "array_declarator" => {
                let inner = node.child_by_field_name("declarator")?;
                let (name, pointers, mut suffix) = self.declarator_parts(inner)?;
                let size = node
                    .child_by_field_name("size")
                    .map(|s| self.text(s).to_string())
                    .unwrap_or_default();
                suffix.push_str(&format!("[{size}]"));
                Some((name, pointers, suffix))
            }
            "pointer_declarator" => {
                let inner = node.child_by_field_name("declarator")?;
                let (name, mut pointers, suffix) = self.declarator_parts(inner)?;
                pointers.insert(0, '*');
                Some((name, pointers, suffix))
            }
            "reference_declarator" => {
                let inner = Self::children(node)
                    .into_iter()
                    .find(|c| c.is_named())?;
                let (name, mut pointers, suffix) = self.declarator_parts(inner)?;
                pointers.insert(0, '&');
                Some((name, pointers, suffix))
            }
            "function_declarator" => None,
            "init_declarator" => {
                let inner = node.child_by_field_name("declarator")?;
                self.declarator_parts(inner)
            }
            _ => None,
        }
    }

    /// Walk an enum definition.
    fn walk_enum(&mut self, node: tree_sitter::Node, access: Access, stmt_end: usize, ctx: Ctx) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            debug!("anonymous enum skipped");
            return;
        };
        let name = self.text(name_node).to_string();
        let qualified = self.display_path(&name);
        self.known_types.insert(self.key_path(&name));

        if self.generated_enums.contains(&qualified) {
            debug!(enum_name = %qualified, "marker present, skipping");
            return;
        }
        if self.scopes.iter().any(|s| s.template) {
            self.diagnostics.warning(
                format!("enum `{qualified}` inside a template cannot get a formatter"),
                node.start_byte()..node.end_byte(),
            );
            return;
        }

        let scoped = Self::children(node)
            .iter()
            .any(|c| matches!(c.kind(), "class" | "struct"));

        let spelled_base = node
            .child_by_field_name("base")
            .or_else(|| {
                // Grammar fallback: first named child after the `:` token.
                let children = Self::children(node);
                let colon = children.iter().position(|c| c.kind() == ":")?;
                children[colon + 1..].iter().find(|c| c.is_named()).copied()
            })
            .map(|b| resolve::normalize_type_text(self.text(b)));

        let mut raw_values: Vec<(String, i128)> = Vec::new();
        let mut known: IndexMap<String, i128> = IndexMap::new();
        let mut next = 0i128;
        for child in Self::children(body) {
            if child.kind() != "enumerator" {
                continue;
            }
            let Some(enum_name) = child.child_by_field_name("name") else {
                continue;
            };
            let enumerator = self.text(enum_name).to_string();
            let value = match child.child_by_field_name("value") {
                Some(expr) => match eval::eval(expr, self.source, &known) {
                    Ok(v) => v,
                    Err(err) => {
                        self.note_eval_fallback(&qualified, &enumerator, &err);
                        next
                    }
                },
                None => next,
            };
            known.insert(enumerator.clone(), value);
            raw_values.push((enumerator, value));
            next = value.wrapping_add(1);
        }

        let repr = match spelled_base.as_deref() {
            Some(text) => repr_from_spelling(text).unwrap_or(EnumRepr::Int),
            None if scoped => EnumRepr::Int,
            None => {
                if raw_values.iter().all(|(_, v)| *v >= 0) {
                    EnumRepr::UInt
                } else {
                    EnumRepr::Int
                }
            }
        };

        let enumerators = raw_values
            .into_iter()
            .map(|(name, value)| Enumerator {
                name,
                value: repr.wrap(value),
            })
            .collect();

        let record_scopes: Vec<&Scope> = self
            .scopes
            .iter()
            .filter(|s| s.kind == ScopeKind::Record)
            .collect();
        let effective = record_scopes
            .iter()
            .map(|s| s.access)
            .fold(access, |acc, a| acc.strictest(a));

        let (local_name, anchor) = if record_scopes.is_empty() {
            (name.clone(), stmt_end)
        } else if effective.reachable_from_namespace() {
            let mut segments: Vec<&str> =
                record_scopes.iter().map(|s| s.display.as_str()).collect();
            segments.push(&name);
            (
                segments.join("::"),
                ctx.record_stmt_end.unwrap_or(stmt_end),
            )
        } else {
            (qualified.clone(), ctx.top_level_end)
        };

        self.decls.push(Decl::Enum(EnumDecl {
            name: qualified,
            local_name,
            scoped,
            repr,
            access: effective,
            enumerators,
            insert_at: line_end_after(self.source, anchor),
            depth: self.scopes.len() + 1,
        }));
    }

    fn note_eval_fallback(&mut self, enum_name: &str, enumerator: &str, err: &EvalError) {
        debug!(
            %enum_name,
            %enumerator,
            error = %err,
            "initialiser not evaluated, using implicit increment"
        );
    }
}

/// Split `TBase<X1>` into its head and normalized argument spellings.
fn split_template_name(text: &str) -> (String, Vec<String>) {
    let Some(open) = text.find('<') else {
        return (text.to_string(), Vec::new());
    };
    let head = text[..open].to_string();
    let inner = text[open + 1..].trim_end_matches('>');
    let mut args = Vec::new();
    let mut level = 0usize;
    let mut current = String::new();
    for ch in inner.chars() {
        match ch {
            '<' => {
                level += 1;
                current.push(ch);
            }
            '>' => {
                level = level.saturating_sub(1);
                current.push(ch);
            }
            ',' if level == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    (head, args)
}

/// Byte offset just past the newline that ends the line containing `pos`.
fn line_end_after(source: &str, pos: usize) -> usize {
    match source[pos.min(source.len())..].find('\n') {
        Some(offset) => pos + offset + 1,
        None => source.len(),
    }
}

fn repr_from_spelling(text: &str) -> Option<EnumRepr> {
    match text {
        "int" | "signed" | "signed int" => Some(EnumRepr::Int),
        "unsigned" | "unsigned int" => Some(EnumRepr::UInt),
        "long" | "long int" => Some(EnumRepr::Long),
        "unsigned long" | "unsigned long int" => Some(EnumRepr::ULong),
        "long long" | "long long int" => Some(EnumRepr::LongLong),
        "unsigned long long" | "unsigned long long int" => Some(EnumRepr::ULongLong),
        "short" | "short int" => Some(EnumRepr::Short),
        "unsigned short" | "unsigned short int" => Some(EnumRepr::UShort),
        "char" => Some(EnumRepr::Char),
        "signed char" => Some(EnumRepr::SChar),
        "unsigned char" => Some(EnumRepr::UChar),
        "bool" => Some(EnumRepr::Bool),
        _ => None,
    }
}
