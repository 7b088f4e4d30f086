//! Declaration records: the language-neutral description of one record or
//! enum, as collected by the walker and consumed by the synthesiser.

use serde::Serialize;

/// Access of a declaration at its point of definition.
///
/// `Invalid` means no class scope applies (namespace or file scope); the
/// synthesiser uses it to pick the enum injection form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    Public,
    Protected,
    Private,
    Invalid,
}

impl Access {
    /// Label used in generated record markers. Namespace-scope records are
    /// reported as `PUBLIC`, matching the emitted-comment convention.
    pub fn record_label(self) -> &'static str {
        match self {
            Access::Public | Access::Invalid => "PUBLIC",
            Access::Protected => "PROTECTED",
            Access::Private => "PRIVATE",
        }
    }

    /// Label used in generated enum markers, where namespace scope is
    /// reported as `INVALID`.
    pub fn enum_label(self) -> &'static str {
        match self {
            Access::Public => "PUBLIC",
            Access::Protected => "PROTECTED",
            Access::Private => "PRIVATE",
            Access::Invalid => "INVALID",
        }
    }

    /// Whether a free function at namespace scope can name the declaration.
    pub fn reachable_from_namespace(self) -> bool {
        matches!(self, Access::Public | Access::Invalid)
    }

    /// The stricter of two accesses, used to fold a nesting chain.
    pub fn strictest(self, other: Access) -> Access {
        fn rank(a: Access) -> u8 {
            match a {
                Access::Invalid => 0,
                Access::Public => 1,
                Access::Protected => 2,
                Access::Private => 3,
            }
        }
        if rank(other) > rank(self) { other } else { self }
    }
}

/// Record flavor, as spelled in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    Struct,
    Class,
    Union,
}

impl RecordKind {
    /// Marker-comment label for a non-template record of this kind.
    pub fn decl_label(self) -> &'static str {
        match self {
            RecordKind::Struct => "STRUCT_DECL",
            RecordKind::Class => "CLASS_DECL",
            RecordKind::Union => "UNION_DECL",
        }
    }
}

/// Template parameter flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemplateParamKind {
    /// `typename T` / `class T`
    Type,
    /// `int N`
    NonType,
    /// `template <typename> typename C`
    Template,
}

/// One template parameter of a record primary, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParam {
    pub kind: TemplateParamKind,
    pub name: String,
}

/// Where a member came from, which decides how the generated argument list
/// references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemberOrigin {
    /// Declared directly in the record; referenced bare.
    Own,
    /// Inlined from a base class; referenced through `this->` to bypass
    /// name hiding.
    Inherited { base: String },
    /// Promoted out of an anonymous aggregate field; the member name is the
    /// full accessor path and the reference goes through `this->`.
    Promoted { via: String },
}

/// One `(type, name, origin)` triple of a record's member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSpec {
    /// Resolved display text of the member type (`int`, `char[50]`,
    /// `struct inner`, or the `<{}>` placeholder for template-parameter
    /// types).
    pub type_text: String,
    /// Spelled name; dotted accessor path for promoted members.
    pub name: String,
    pub origin: MemberOrigin,
    /// For `<{}>`-typed members, the template parameter to feed to
    /// `typeid(..).name()`.
    pub typeid_param: Option<String>,
}

impl MemberSpec {
    pub fn own(type_text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_text: type_text.into(),
            name: name.into(),
            origin: MemberOrigin::Own,
            typeid_param: None,
        }
    }

    /// How the generated `to_string()` body refers to this member.
    pub fn argument(&self) -> String {
        match self.origin {
            MemberOrigin::Own => self.name.clone(),
            MemberOrigin::Inherited { .. } | MemberOrigin::Promoted { .. } => {
                format!("this->{}", self.name)
            }
        }
    }
}

/// A record declaration selected for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDecl {
    /// Fully-qualified display name, template placeholders included
    /// (`a::b::c::enclose::outer`, `Map<K, T>`,
    /// `Outer::(unnamed struct at f.cpp:40:3)`).
    pub name: String,
    pub kind: RecordKind,
    pub access: Access,
    /// True for template primaries (`CLASS_TEMPLATE` in markers); false for
    /// plain records and explicit specialisations.
    pub is_template_primary: bool,
    pub params: Vec<TemplateParam>,
    /// Own members first (declaration order), then inherited members in
    /// left-to-right depth-first base order.
    pub members: Vec<MemberSpec>,
    /// Byte offset of the record body's closing brace; the fragment is
    /// spliced immediately before it.
    pub insert_at: usize,
    /// Lexical nesting depth, the splice tie-break for shared offsets.
    pub depth: usize,
}

impl RecordDecl {
    /// Marker-comment kind label (`CLASS_TEMPLATE` for primaries).
    pub fn kind_label(&self) -> &'static str {
        if self.is_template_primary {
            "CLASS_TEMPLATE"
        } else {
            self.kind.decl_label()
        }
    }
}

/// Underlying-type tag reported in enum markers.
///
/// Spellings outside the recognised set (`std::uint8_t` and friends) fall
/// back to `Int`, which is what the emitted comments have always claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnumRepr {
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Short,
    UShort,
    Char,
    SChar,
    UChar,
    Bool,
}

impl EnumRepr {
    pub fn label(self) -> &'static str {
        match self {
            EnumRepr::Int => "INT",
            EnumRepr::UInt => "UINT",
            EnumRepr::Long => "LONG",
            EnumRepr::ULong => "ULONG",
            EnumRepr::LongLong => "LONGLONG",
            EnumRepr::ULongLong => "ULONGLONG",
            EnumRepr::Short => "SHORT",
            EnumRepr::UShort => "USHORT",
            EnumRepr::Char => "CHAR",
            EnumRepr::SChar => "SCHAR",
            EnumRepr::UChar => "UCHAR",
            EnumRepr::Bool => "BOOL",
        }
    }

    /// Bit width of the representation.
    pub fn bits(self) -> u32 {
        match self {
            EnumRepr::Bool => 1,
            EnumRepr::Char | EnumRepr::SChar | EnumRepr::UChar => 8,
            EnumRepr::Short | EnumRepr::UShort => 16,
            EnumRepr::Int | EnumRepr::UInt => 32,
            EnumRepr::Long | EnumRepr::ULong | EnumRepr::LongLong | EnumRepr::ULongLong => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            EnumRepr::Int
                | EnumRepr::Long
                | EnumRepr::LongLong
                | EnumRepr::Short
                | EnumRepr::Char
                | EnumRepr::SChar
                | EnumRepr::Bool
        )
    }

    /// Wrap an evaluated constant into this representation, two's
    /// complement. A 1-bit signed `Bool` maps `ONE, TWO` to `0, -1`.
    pub fn wrap(self, value: i128) -> i128 {
        let bits = self.bits();
        if bits >= 128 {
            return value;
        }
        let mask = (1i128 << bits) - 1;
        let truncated = value & mask;
        if self.is_signed() && truncated & (1i128 << (bits - 1)) != 0 {
            truncated - (1i128 << bits)
        } else {
            truncated
        }
    }
}

/// One enumerator with its concrete index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumerator {
    pub name: String,
    pub value: i128,
}

/// An enum declaration selected for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDecl {
    /// Fully-qualified display name (`Test::new_ns::S`, `Xclass::cdir`).
    pub name: String,
    /// Name relative to the insertion scope, used in the emitted signature
    /// and case labels (`dir` next to its namespace, `Xstruct::dir` when
    /// hoisted past a record).
    pub local_name: String,
    pub scoped: bool,
    pub repr: EnumRepr,
    pub access: Access,
    pub enumerators: Vec<Enumerator>,
    /// Byte offset just past the closing line of the hoist target; the
    /// fragment is spliced there, never inside the enum's braces.
    pub insert_at: usize,
    pub depth: usize,
}

impl EnumDecl {
    /// Qualifier for case labels: through the enum name for scoped enums,
    /// through the enclosing scope only for unscoped ones.
    pub fn case_prefix(&self) -> String {
        if self.scoped {
            format!("{}::", self.local_name)
        } else {
            match self.local_name.rsplit_once("::") {
                Some((scope, _)) => format!("{scope}::"),
                None => String::new(),
            }
        }
    }
}

/// The unit of work handed from the walker to the synthesiser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Decl {
    Record(RecordDecl),
    Enum(EnumDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Record(r) => &r.name,
            Decl::Enum(e) => &e.name,
        }
    }

    pub fn insert_at(&self) -> usize {
        match self {
            Decl::Record(r) => r.insert_at,
            Decl::Enum(e) => e.insert_at,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Decl::Record(r) => r.depth,
            Decl::Enum(e) => e.depth,
        }
    }
}
