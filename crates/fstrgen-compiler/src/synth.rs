//! Snippet synthesis: turns declaration records into the text fragments
//! spliced back into the source.
//!
//! Fragment layout is fixed; the splice offset decides the indentation of
//! the first line (whatever whitespace already precedes the closing brace),
//! while the remaining lines use the canonical two-space body indent.

use fstrgen_core::{Decl, EnumDecl, RecordDecl};

use crate::walker::{ENUM_MARKER, RECORD_MARKER};

/// Fragment for any declaration record.
pub fn fragment(decl: &Decl) -> String {
    match decl {
        Decl::Record(record) => record_fragment(record),
        Decl::Enum(enumeration) => enum_fragment(enumeration),
    }
}

/// Member `to_string()` fragment, spliced immediately before the record's
/// closing brace.
///
/// The `public:` label is emitted unconditionally; a redundant label is
/// harmless and saves tracking the access state at the insertion point.
pub fn record_fragment(record: &RecordDecl) -> String {
    let mut pairs = Vec::with_capacity(record.members.len());
    let mut args = Vec::with_capacity(record.members.len());
    let mut prev_type: Option<&str> = None;

    for member in &record.members {
        let show_type = prev_type != Some(member.type_text.as_str());
        if show_type {
            if let Some(param) = &member.typeid_param {
                args.push(format!("typeid({param}).name()"));
            }
            pairs.push(format!("{} {}={{}}", member.type_text, member.name));
        } else {
            pairs.push(format!("{}={{}}", member.name));
        }
        args.push(member.argument());
        prev_type = Some(member.type_text.as_str());
    }

    let pairs_part = if pairs.is_empty() {
        String::new()
    } else {
        format!(" {}", pairs.join(", "))
    };
    let args_part = if args.is_empty() {
        String::new()
    } else {
        format!(", {}", args.join(", "))
    };

    format!(
        "{marker} {access} {kind} {name}\n  \
         public:\n  \
         auto to_string() const {{\n    \
         return fstr::format(R\"( {name}:{pairs}\n)\"{args});\n  \
         }}\n",
        marker = RECORD_MARKER,
        access = record.access.record_label(),
        kind = record.kind_label(),
        name = record.name,
        pairs = pairs_part,
        args = args_part,
    )
}

/// Formatter fragment for an enum: a free `format_as` overload where a
/// namespace-scope function can reach the type, a `fmt::formatter`
/// specialisation otherwise.
pub fn enum_fragment(decl: &EnumDecl) -> String {
    if decl.access.reachable_from_namespace() {
        format_as_fragment(decl)
    } else {
        formatter_specialisation_fragment(decl)
    }
}

fn marker_line(decl: &EnumDecl) -> String {
    format!(
        "{ENUM_MARKER} {access} enum {name} of type {repr}{scoped}\n",
        access = decl.access.enum_label(),
        name = decl.name,
        repr = decl.repr.label(),
        scoped = if decl.scoped { " scoped" } else { "" },
    )
}

/// Column-padded switch body shared by both fragment forms.
fn switch_cases(decl: &EnumDecl, indent: &str) -> String {
    let width = decl
        .enumerators
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(0);
    let prefix = decl.case_prefix();

    let mut out = String::new();
    for enumerator in &decl.enumerators {
        let pad = " ".repeat(width - enumerator.name.len());
        out.push_str(&format!(
            "{indent}case {prefix}{name}{pad}: name = \"{name}\"{pad}; break;  // index={value}\n",
            name = enumerator.name,
            value = enumerator.value,
        ));
    }
    out
}

fn format_as_fragment(decl: &EnumDecl) -> String {
    format!(
        "{marker}\
         constexpr auto format_as(const {local} obj) {{\n  \
         fmt::string_view name = \"<missing>\";\n  \
         switch (obj) {{\n\
         {cases}  \
         }}\n  \
         return name;\n\
         }}\n",
        marker = marker_line(decl),
        local = decl.local_name,
        cases = switch_cases(decl, "    "),
    )
}

fn formatter_specialisation_fragment(decl: &EnumDecl) -> String {
    format!(
        "{marker}\
         template <>\n\
         struct fmt::formatter<{local}>: formatter<string_view> {{\n  \
         template <typename FormatContext>\n  \
         auto format({local} val, FormatContext& ctx) const {{\n    \
         string_view name = \"<unknown>\";\n    \
         switch (val) {{\n\
         {cases}    \
         }}\n    \
         return formatter<string_view>::format(name, ctx);\n  \
         }}\n\
         }};\n",
        marker = marker_line(decl),
        local = decl.local_name,
        cases = switch_cases(decl, "        "),
    )
}
